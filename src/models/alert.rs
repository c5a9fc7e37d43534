use chrono::NaiveDateTime;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::alert_rule::Severity;
use crate::models::entities::{alert_history, alerts, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Open,
    Acknowledged,
    Suppressed,
    Resolved,
}

impl AlertState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Acknowledged => "acknowledged",
            Self::Suppressed => "suppressed",
            Self::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "acknowledged" => Self::Acknowledged,
            "suppressed" => Self::Suppressed,
            "resolved" => Self::Resolved,
            _ => Self::Open,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub rule_id: Uuid,
    pub device_id: Uuid,
    pub severity: Severity,
    pub state: AlertState,
    pub title: String,
    pub message: String,
    pub details: serde_json::Value,
    pub first_occurred: NaiveDateTime,
    pub last_occurred: NaiveDateTime,
    pub occurrences: i32,
    pub suppressed_until: Option<NaiveDateTime>,
    pub notifications_sent: i32,
    pub escalation_level: i32,
    pub correlation_key: String,
}

impl From<alerts::Model> for Alert {
    fn from(m: alerts::Model) -> Self {
        Self {
            id: m.id,
            rule_id: m.rule_id,
            device_id: m.device_id,
            severity: Severity::parse(&m.severity),
            state: AlertState::parse(&m.state),
            title: m.title,
            message: m.message,
            details: m.details,
            first_occurred: m.first_occurred,
            last_occurred: m.last_occurred,
            occurrences: m.occurrences,
            suppressed_until: m.suppressed_until,
            notifications_sent: m.notifications_sent,
            escalation_level: m.escalation_level,
            correlation_key: m.correlation_key,
        }
    }
}

impl Alert {
    pub async fn find_open_by_correlation_key(
        db: &DatabaseConnection,
        correlation_key: &str,
    ) -> Result<Option<Alert>> {
        let model = Alerts::find()
            .filter(alerts::Column::CorrelationKey.eq(correlation_key))
            .filter(alerts::Column::State.is_in(["open", "acknowledged", "suppressed"]))
            .one(db)
            .await?;
        Ok(model.map(Alert::from))
    }

    pub async fn trigger(
        db: &DatabaseConnection,
        rule_id: Uuid,
        device_id: Uuid,
        severity: Severity,
        title: String,
        message: String,
        details: serde_json::Value,
        correlation_key: String,
    ) -> Result<Alert> {
        let now = chrono::Utc::now().naive_utc();
        let active = alerts::ActiveModel {
            id: Set(Uuid::new_v4()),
            rule_id: Set(rule_id),
            device_id: Set(device_id),
            severity: Set(severity.as_str().to_string()),
            state: Set(AlertState::Open.as_str().to_string()),
            title: Set(title),
            message: Set(message),
            details: Set(details),
            first_occurred: Set(now),
            last_occurred: Set(now),
            occurrences: Set(1),
            acknowledged_at: Set(None),
            acknowledged_by: Set(None),
            resolved_at: Set(None),
            resolved_by: Set(None),
            suppressed_until: Set(None),
            notifications_sent: Set(0),
            last_notification_sent: Set(None),
            escalation_level: Set(0),
            correlation_key: Set(correlation_key),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = active.insert(db).await?;
        AlertHistoryEntry::append(db, inserted.id, "evaluator", None, "open", None).await?;
        Ok(Alert::from(inserted))
    }

    pub async fn bump_occurrence(db: &DatabaseConnection, id: Uuid) -> Result<()> {
        if let Some(model) = Alerts::find_by_id(id).one(db).await? {
            let occurrences = model.occurrences + 1;
            let mut active: alerts::ActiveModel = model.into();
            active.occurrences = Set(occurrences);
            active.last_occurred = Set(chrono::Utc::now().naive_utc());
            active.updated_at = Set(chrono::Utc::now().naive_utc());
            active.update(db).await?;
        }
        Ok(())
    }

    pub async fn transition(db: &DatabaseConnection, id: Uuid, to: AlertState, actor: &str, note: Option<String>) -> Result<()> {
        if let Some(model) = Alerts::find_by_id(id).one(db).await? {
            let from_state = model.state.clone();
            let mut active: alerts::ActiveModel = model.into();
            active.state = Set(to.as_str().to_string());
            let now = chrono::Utc::now().naive_utc();
            match to {
                AlertState::Resolved => {
                    active.resolved_at = Set(Some(now));
                    active.resolved_by = Set(Some(actor.to_string()));
                }
                AlertState::Acknowledged => {
                    active.acknowledged_at = Set(Some(now));
                    active.acknowledged_by = Set(Some(actor.to_string()));
                }
                _ => {}
            }
            active.updated_at = Set(now);
            active.update(db).await?;
            AlertHistoryEntry::append(db, id, actor, Some(from_state), to.as_str(), note).await?;
        }
        Ok(())
    }

    pub async fn mark_notified(db: &DatabaseConnection, id: Uuid) -> Result<()> {
        if let Some(model) = Alerts::find_by_id(id).one(db).await? {
            let sent = model.notifications_sent + 1;
            let mut active: alerts::ActiveModel = model.into();
            active.notifications_sent = Set(sent);
            active.last_notification_sent = Set(Some(chrono::Utc::now().naive_utc()));
            active.updated_at = Set(chrono::Utc::now().naive_utc());
            active.update(db).await?;
        }
        Ok(())
    }

    pub async fn list_open(db: &DatabaseConnection) -> Result<Vec<Alert>> {
        let models = Alerts::find()
            .filter(alerts::Column::State.is_in(["open", "acknowledged", "suppressed"]))
            .all(db)
            .await?;
        Ok(models.into_iter().map(Alert::from).collect())
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Alert>> {
        Ok(Alerts::find_by_id(id).one(db).await?.map(Alert::from))
    }

    /// Backs `list_alerts(filters)` from the operational surface
    /// contract; every filter field is optional and AND-combined.
    pub async fn list_filtered(
        db: &DatabaseConnection,
        device_id: Option<Uuid>,
        severity: Option<Severity>,
        state: Option<AlertState>,
    ) -> Result<Vec<Alert>> {
        let mut query = Alerts::find();
        if let Some(device_id) = device_id {
            query = query.filter(alerts::Column::DeviceId.eq(device_id));
        }
        if let Some(severity) = severity {
            query = query.filter(alerts::Column::Severity.eq(severity.as_str()));
        }
        if let Some(state) = state {
            query = query.filter(alerts::Column::State.eq(state.as_str()));
        }
        let models = query.all(db).await?;
        Ok(models.into_iter().map(Alert::from).collect())
    }

}

pub struct AlertHistoryEntry;

impl AlertHistoryEntry {
    pub async fn append(
        db: &DatabaseConnection,
        alert_id: Uuid,
        actor: &str,
        from_state: Option<String>,
        to_state: &str,
        note: Option<String>,
    ) -> Result<()> {
        let active = alert_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            alert_id: Set(alert_id),
            at: Set(chrono::Utc::now().naive_utc()),
            actor: Set(actor.to_string()),
            from_state: Set(from_state),
            to_state: Set(to_state.to_string()),
            note: Set(note),
        };
        active.insert(db).await?;
        Ok(())
    }
}
