use sea_orm::*;
use uuid::Uuid;

use crate::error::Result;
use crate::models::entities::{alert_rules, prelude::*};

/// Well-known rule id threshold breaches from the interface poller are
/// attributed to, per spec.md §4.6 ("forwarded to the alert engine as
/// a synthetic rule trigger of id `interface-monitoring`"). Alerts
/// reference `alert_rules.id` with no cascade, so a real row must
/// exist for the foreign key even though no operator authored it.
pub const INTERFACE_MONITORING_RULE_ID: Uuid = Uuid::from_u128(0x696e746572666163655f6d6f6e);
pub const SENSOR_MONITORING_RULE_ID: Uuid = Uuid::from_u128(0x73656e736f725f6d6f6e69746f72);

/// Upserts the two synthetic rules the pollers attach threshold-breach
/// alerts to. Idempotent: safe to call on every process start.
pub async fn ensure_synthetic_rules(db: &DatabaseConnection) -> Result<()> {
    ensure_one(db, INTERFACE_MONITORING_RULE_ID, "interface-monitoring", "warning").await?;
    ensure_one(db, SENSOR_MONITORING_RULE_ID, "sensor-monitoring", "warning").await?;
    Ok(())
}

async fn ensure_one(db: &DatabaseConnection, id: Uuid, name: &str, severity: &str) -> Result<()> {
    if AlertRules::find_by_id(id).one(db).await?.is_some() {
        return Ok(());
    }
    let now = chrono::Utc::now().naive_utc();
    let active = alert_rules::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        severity: Set(severity.to_string()),
        enabled: Set(true),
        device_filter: Set(None),
        conditions: Set(serde_json::json!([])),
        delay_seconds: Set(0),
        interval_seconds: Set(60),
        recovery: Set(true),
        acknowledgeable: Set(true),
        suppressable: Set(true),
        translations: Set(serde_json::json!({})),
        created_at: Set(now),
        updated_at: Set(now),
    };
    active.insert(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_rule_ids_are_distinct() {
        assert_ne!(INTERFACE_MONITORING_RULE_ID, SENSOR_MONITORING_RULE_ID);
    }
}
