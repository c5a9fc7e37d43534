use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::alerts::evaluator::AlertEvaluator;
use crate::error::{Result, YmError};
use crate::models::alert::{Alert, AlertState};
use crate::models::alert_rule::Severity;
use crate::notify::send_alert_notifications;

/// Operator-facing alert lifecycle transitions and notification
/// replay, grounded on the operational surface contract in spec.md
/// §6 (`list_alerts`, `resolve_alert`, `acknowledge_alert`,
/// `suppress_alert`).
pub struct AlertService {
    db: DatabaseConnection,
}

#[derive(Debug, Default, Clone)]
pub struct AlertFilters {
    pub device_id: Option<Uuid>,
    pub severity: Option<Severity>,
    pub state: Option<AlertState>,
}

impl AlertService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_alerts(&self, filters: AlertFilters) -> Result<Vec<Alert>> {
        Alert::list_filtered(&self.db, filters.device_id, filters.severity, filters.state).await
    }

    pub async fn get_alert(&self, id: Uuid) -> Result<Alert> {
        Alert::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| YmError::NotFound { kind: "alert", id: id.to_string() })
    }

    pub async fn resolve_alert(&self, id: Uuid, actor: &str, note: Option<String>) -> Result<()> {
        self.get_alert(id).await?;
        AlertEvaluator::resolve(&self.db, id, actor, note).await
    }

    /// No-op on an already-acknowledged alert, per the round-trip
    /// invariant in spec.md §8.
    pub async fn acknowledge_alert(&self, id: Uuid, actor: &str) -> Result<()> {
        let alert = self.get_alert(id).await?;
        if alert.state == AlertState::Acknowledged {
            return Ok(());
        }
        AlertEvaluator::acknowledge(&self.db, id, actor).await
    }

    pub async fn suppress_alert(&self, id: Uuid, until: NaiveDateTime, actor: &str) -> Result<()> {
        self.get_alert(id).await?;
        AlertEvaluator::suppress(&self.db, id, until, actor).await
    }

    /// Re-dispatches an already-triggered alert to an explicit
    /// transport subset (or all enabled transports when `None`), for
    /// operator-initiated resends.
    pub async fn redispatch(&self, id: Uuid, transport_ids: Option<&[Uuid]>) -> Result<usize> {
        let alert = self.get_alert(id).await?;
        send_alert_notifications(&self.db, &alert, transport_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_default_to_unrestricted() {
        let filters = AlertFilters::default();
        assert!(filters.device_id.is_none());
        assert!(filters.severity.is_none());
        assert!(filters.state.is_none());
    }
}
