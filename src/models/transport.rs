use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::entities::{alert_transports, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Email,
    Webhook,
    Slack,
    Telegram,
    Teams,
    Sms,
}

impl TransportKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "webhook" => Some(Self::Webhook),
            "slack" => Some(Self::Slack),
            "telegram" => Some(Self::Telegram),
            "teams" => Some(Self::Teams),
            "sms" => Some(Self::Sms),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Webhook => "webhook",
            Self::Slack => "slack",
            Self::Telegram => "telegram",
            Self::Teams => "teams",
            Self::Sms => "sms",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTransport {
    pub id: Uuid,
    pub name: String,
    pub kind: TransportKind,
    pub enabled: bool,
    pub config: serde_json::Value,
    pub filter_conditions: Option<serde_json::Value>,
}

impl TryFrom<alert_transports::Model> for NotificationTransport {
    type Error = crate::error::YmError;

    fn try_from(m: alert_transports::Model) -> Result<Self> {
        let kind = TransportKind::parse(&m.r#type).ok_or_else(|| {
            crate::error::YmError::Internal(format!("unknown transport type {}", m.r#type))
        })?;
        Ok(Self {
            id: m.id,
            name: m.name,
            kind,
            enabled: m.enabled,
            config: m.config,
            filter_conditions: m.filter_conditions,
        })
    }
}

impl NotificationTransport {
    pub async fn list_enabled(db: &DatabaseConnection) -> Result<Vec<NotificationTransport>> {
        let models = AlertTransports::find()
            .filter(alert_transports::Column::Enabled.eq(true))
            .all(db)
            .await?;
        models.into_iter().map(NotificationTransport::try_from).collect()
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<NotificationTransport>> {
        match AlertTransports::find_by_id(id).one(db).await? {
            Some(m) => Ok(Some(NotificationTransport::try_from(m)?)),
            None => Ok(None),
        }
    }

    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<NotificationTransport>> {
        let models = AlertTransports::find().all(db).await?;
        models.into_iter().map(NotificationTransport::try_from).collect()
    }
}
