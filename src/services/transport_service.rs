use sea_orm::*;
use serde_json::json;
use uuid::Uuid;

use crate::error::{Result, YmError};
use crate::models::alert::{Alert, AlertState};
use crate::models::alert_rule::Severity;
use crate::models::entities::{alert_transports, prelude::*};
use crate::models::transport::NotificationTransport;
use crate::notify::transports::adapter_for;
use crate::notify::templates::template_vars;

/// Operator-facing transport CRUD and connectivity probing, grounded
/// on the operational surface contract in spec.md §6 (`list_transports`,
/// `test_transport`).
pub struct TransportService {
    db: DatabaseConnection,
}

impl TransportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_transports(&self) -> Result<Vec<NotificationTransport>> {
        NotificationTransport::list_all(&self.db).await
    }

    pub async fn get_transport(&self, id: Uuid) -> Result<NotificationTransport> {
        NotificationTransport::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| YmError::NotFound { kind: "notification_transport", id: id.to_string() })
    }

    pub async fn create_transport(&self, transport: NotificationTransport) -> Result<NotificationTransport> {
        let now = chrono::Utc::now().naive_utc();
        let active = alert_transports::ActiveModel {
            id: Set(transport.id),
            name: Set(transport.name),
            r#type: Set(transport.kind.as_str().to_string()),
            enabled: Set(transport.enabled),
            config: Set(transport.config),
            filter_conditions: Set(transport.filter_conditions),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = active.insert(&self.db).await?;
        NotificationTransport::try_from(inserted)
    }

    pub async fn delete_transport(&self, id: Uuid) -> Result<()> {
        AlertTransports::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Sends a synthetic "test" alert through one transport's adapter
    /// without touching the alerts table, so an operator can validate
    /// webhook URLs, Slack tokens, and SMTP reachability in isolation.
    pub async fn test_transport(&self, id: Uuid) -> Result<String> {
        let transport = self.get_transport(id).await?;
        let probe = Alert {
            id: Uuid::new_v4(),
            rule_id: Uuid::nil(),
            device_id: Uuid::nil(),
            severity: Severity::Info,
            state: AlertState::Open,
            title: "Test notification".to_string(),
            message: "This is a connectivity test from the notification dispatcher.".to_string(),
            details: json!({"test": true}),
            first_occurred: chrono::Utc::now().naive_utc(),
            last_occurred: chrono::Utc::now().naive_utc(),
            occurrences: 1,
            suppressed_until: None,
            notifications_sent: 0,
            escalation_level: 0,
            correlation_key: "test:probe".to_string(),
        };
        let vars = template_vars(&probe);
        let adapter = adapter_for(transport.kind);
        adapter
            .send(&transport, &probe, &vars)
            .await
            .map_err(|reason| YmError::TransportFailed { transport_id: id.to_string(), reason })
    }
}
