use sea_orm::*;
use uuid::Uuid;

use crate::alerts::context::build_for_device;
use crate::alerts::AlertEvaluator;
use crate::error::{Result, YmError};
use crate::models::alert_rule::AlertRule;
use crate::models::device::Device;
use crate::models::entities::{alert_rules, prelude::*};

/// Operator-facing rule CRUD and ad-hoc evaluation, grounded on the
/// operational surface contract in spec.md §6 (`list_rules`,
/// `create/update/delete_rule`, `test_rule`).
pub struct RuleService {
    db: DatabaseConnection,
    evaluator: AlertEvaluator,
}

impl RuleService {
    pub fn new(db: DatabaseConnection, evaluator: AlertEvaluator) -> Self {
        Self { db, evaluator }
    }

    pub async fn list_rules(&self) -> Result<Vec<AlertRule>> {
        let models = AlertRules::find().all(&self.db).await?;
        models.into_iter().map(AlertRule::try_from).collect()
    }

    pub async fn create_rule(&self, rule: AlertRule) -> Result<AlertRule> {
        let now = chrono::Utc::now().naive_utc();
        let active = alert_rules::ActiveModel {
            id: Set(rule.id),
            name: Set(rule.name),
            severity: Set(rule.severity.as_str().to_string()),
            enabled: Set(rule.enabled),
            device_filter: Set(rule.device_filter.map(|f| serde_json::to_value(f).unwrap_or_default())),
            conditions: Set(serde_json::to_value(&rule.conditions.0).unwrap_or_default()),
            delay_seconds: Set(rule.delay_seconds as i32),
            interval_seconds: Set(rule.interval_seconds as i32),
            recovery: Set(rule.recovery),
            acknowledgeable: Set(rule.acknowledgeable),
            suppressable: Set(rule.suppressable),
            translations: Set(serde_json::to_value(&rule.translations).unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = active.insert(&self.db).await?;
        AlertRule::try_from(inserted)
    }

    pub async fn update_rule(&self, rule: AlertRule) -> Result<AlertRule> {
        let Some(existing) = AlertRules::find_by_id(rule.id).one(&self.db).await? else {
            return Err(YmError::NotFound {
                kind: "alert_rule",
                id: rule.id.to_string(),
            });
        };
        let mut active: alert_rules::ActiveModel = existing.into();
        active.name = Set(rule.name);
        active.severity = Set(rule.severity.as_str().to_string());
        active.enabled = Set(rule.enabled);
        active.device_filter = Set(rule.device_filter.map(|f| serde_json::to_value(f).unwrap_or_default()));
        active.conditions = Set(serde_json::to_value(&rule.conditions.0).unwrap_or_default());
        active.delay_seconds = Set(rule.delay_seconds as i32);
        active.interval_seconds = Set(rule.interval_seconds as i32);
        active.recovery = Set(rule.recovery);
        active.acknowledgeable = Set(rule.acknowledgeable);
        active.suppressable = Set(rule.suppressable);
        active.translations = Set(serde_json::to_value(&rule.translations).unwrap_or_default());
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        let updated = active.update(&self.db).await?;
        AlertRule::try_from(updated)
    }

    pub async fn delete_rule(&self, id: Uuid) -> Result<()> {
        AlertRule::delete(&self.db, id).await
    }

    /// Dry-runs a rule against one device's current metric context
    /// without creating an alert or touching correlation state,
    /// per `test_rule(rule, device_id?)` in spec.md §6.
    pub async fn test_rule(&self, rule_id: Uuid, device_id: Uuid) -> Result<bool> {
        let Some(rule) = AlertRule::find_by_id(&self.db, rule_id).await? else {
            return Err(YmError::NotFound {
                kind: "alert_rule",
                id: rule_id.to_string(),
            });
        };
        let Some(device) = Device::find_by_id(&self.db, device_id).await? else {
            return Err(YmError::NotFound {
                kind: "device",
                id: device_id.to_string(),
            });
        };
        let context = build_for_device(&self.db, &device).await?;
        Ok(rule.matches_device(&device) && rule.conditions.evaluate(&context))
    }
}

impl std::ops::Deref for RuleService {
    type Target = AlertEvaluator;

    fn deref(&self) -> &Self::Target {
        &self.evaluator
    }
}
