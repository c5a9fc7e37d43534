use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

use crate::alerts::synthetic::ensure_synthetic_rules;
use crate::error::Result;
use crate::models::device::{CreateDeviceRequest, Device, SnmpConfig};
use crate::models::entities::{alert_rules, alert_transports, prelude::*};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

/// Seeds a couple of sample devices, one operator-authored rule, and
/// one disabled webhook transport, so a fresh environment has
/// something to discover/poll/alert against immediately. Mirrors the
/// teacher's development-only seeder, scoped to this domain's tables.
pub async fn seed_development(db: &DatabaseConnection) -> Result<()> {
    ensure_synthetic_rules(db).await?;

    if Devices::find().one(db).await?.is_none() {
        Device::create(
            db,
            CreateDeviceRequest {
                hostname: "core-sw-1.lab.local".to_string(),
                address: "192.0.2.10".to_string(),
                snmp_config: SnmpConfig::default(),
                device_type: Some("switch".to_string()),
                groups: vec!["lab".to_string()],
                location: Some("lab-rack-1".to_string()),
            },
        )
        .await?;
        Device::create(
            db,
            CreateDeviceRequest {
                hostname: "edge-rtr-1.lab.local".to_string(),
                address: "192.0.2.20".to_string(),
                snmp_config: SnmpConfig::default(),
                device_type: Some("router".to_string()),
                groups: vec!["lab".to_string()],
                location: Some("lab-rack-1".to_string()),
            },
        )
        .await?;
    }

    if AlertRules::find().one(db).await?.is_none() {
        let now = chrono::Utc::now().naive_utc();
        alert_rules::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("device-unreachable".to_string()),
            severity: Set("critical".to_string()),
            enabled: Set(true),
            device_filter: Set(None),
            conditions: Set(json!([{"field": "device.status", "op": "eq", "value": "down"}])),
            delay_seconds: Set(120),
            interval_seconds: Set(60),
            recovery: Set(true),
            acknowledgeable: Set(true),
            suppressable: Set(true),
            translations: Set(json!({"en": {"title": "{{device.hostname}} is unreachable", "message": "No SNMP response from {{device.hostname}}"}})),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
    }

    if AlertTransports::find().one(db).await?.is_none() {
        let now = chrono::Utc::now().naive_utc();
        alert_transports::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("ops-webhook".to_string()),
            r#type: Set("webhook".to_string()),
            enabled: Set(false),
            config: Set(json!({"url": "https://example.invalid/ymonitor-alerts"})),
            filter_conditions: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
