use chrono::NaiveDateTime;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::entities::{alert_notifications, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertNotification {
    pub id: Uuid,
    pub alert_id: Uuid,
    pub transport_id: Uuid,
    pub status: String,
    pub attempts: i32,
    pub last_attempt: Option<NaiveDateTime>,
    pub sent_at: Option<NaiveDateTime>,
    pub error: Option<String>,
}

impl From<alert_notifications::Model> for AlertNotification {
    fn from(m: alert_notifications::Model) -> Self {
        Self {
            id: m.id,
            alert_id: m.alert_id,
            transport_id: m.transport_id,
            status: m.status,
            attempts: m.attempts,
            last_attempt: m.last_attempt,
            sent_at: m.sent_at,
            error: m.error,
        }
    }
}

impl AlertNotification {
    pub async fn create_pending(
        db: &DatabaseConnection,
        alert_id: Uuid,
        transport_id: Uuid,
    ) -> Result<AlertNotification> {
        let now = chrono::Utc::now().naive_utc();
        let active = alert_notifications::ActiveModel {
            id: Set(Uuid::new_v4()),
            alert_id: Set(alert_id),
            transport_id: Set(transport_id),
            status: Set(NotificationStatus::Pending.as_str().to_string()),
            attempts: Set(0),
            last_attempt: Set(None),
            sent_at: Set(None),
            error: Set(None),
            response: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = active.insert(db).await?;
        Ok(AlertNotification::from(inserted))
    }

    pub async fn record_attempt(
        db: &DatabaseConnection,
        id: Uuid,
        outcome: std::result::Result<String, String>,
    ) -> Result<()> {
        if let Some(model) = AlertNotifications::find_by_id(id).one(db).await? {
            let attempts = model.attempts + 1;
            let mut active: alert_notifications::ActiveModel = model.into();
            active.attempts = Set(attempts);
            active.last_attempt = Set(Some(chrono::Utc::now().naive_utc()));
            match outcome {
                Ok(response) => {
                    active.status = Set(NotificationStatus::Sent.as_str().to_string());
                    active.sent_at = Set(Some(chrono::Utc::now().naive_utc()));
                    active.response = Set(Some(response));
                    active.error = Set(None);
                }
                Err(reason) => {
                    active.status = Set(NotificationStatus::Failed.as_str().to_string());
                    active.error = Set(Some(reason));
                }
            }
            active.updated_at = Set(chrono::Utc::now().naive_utc());
            active.update(db).await?;
        }
        Ok(())
    }
}
