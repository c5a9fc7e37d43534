use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::Value as Json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::alerts::correlation::CorrelationMap;
use crate::error::Result;
use crate::models::alert::{Alert, AlertState};
use crate::models::alert_rule::AlertRule;
use crate::models::device::Device;

/// Outcome of evaluating one rule against one device's metric context
/// for a single tick, per spec.md §4.7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// Condition false and nothing was open; no action.
    Idle,
    /// Condition true for the first time; armed a pending trigger that
    /// matures after `delay_seconds`.
    Armed,
    /// Condition still true but the pending delay hasn't matured yet.
    Pending,
    /// Delay matured; created a new open alert.
    Triggered(Uuid),
    /// Condition true and an alert was already open; bumped occurrence
    /// count without re-notifying.
    Reoccurred(Uuid),
    /// Condition went false on a rule with `recovery=true` and an open
    /// alert existed; transitioned it to resolved.
    Recovered(Uuid),
    /// Condition went false on a rule without `recovery`; the open
    /// alert (if any) is left untouched until manually resolved.
    ConditionCleared,
}

/// Tick-based rule evaluator. Holds no state of its own beyond the
/// shared `CorrelationMap`; everything else is read fresh from the
/// database each tick the way the teacher's worker loop re-reads job
/// state rather than caching it in memory.
#[derive(Clone)]
pub struct AlertEvaluator {
    correlation: CorrelationMap,
}

impl AlertEvaluator {
    pub fn new(correlation: CorrelationMap) -> Self {
        Self { correlation }
    }

    /// Evaluates every enabled rule against the current metric context
    /// for `device`, applying delay/recovery/occurrence/suppression
    /// semantics, and returns the outcome per rule.
    pub async fn tick(
        &self,
        db: &DatabaseConnection,
        device: &Device,
        rules: &[AlertRule],
        context: &Json,
    ) -> Result<Vec<(Uuid, EvaluationOutcome)>> {
        let mut outcomes = Vec::with_capacity(rules.len());
        for rule in rules {
            if !rule.enabled || !rule.matches_device(device) {
                continue;
            }
            let outcome = self.evaluate_rule(db, device, rule, context).await?;
            outcomes.push((rule.id, outcome));
        }
        Ok(outcomes)
    }

    async fn evaluate_rule(
        &self,
        db: &DatabaseConnection,
        device: &Device,
        rule: &AlertRule,
        context: &Json,
    ) -> Result<EvaluationOutcome> {
        let correlation_key = rule.correlation_key(device.id);
        let pending_key = format!("pending:{correlation_key}");
        let is_true = rule.conditions.evaluate(context);
        let existing = Alert::find_open_by_correlation_key(db, &correlation_key).await?;

        if let Some(alert) = &existing {
            if alert.state == AlertState::Suppressed {
                if let Some(until) = alert.suppressed_until {
                    if chrono::Utc::now().naive_utc() < until {
                        return Ok(EvaluationOutcome::Pending);
                    }
                    Alert::transition(db, alert.id, AlertState::Open, "evaluator", Some("suppression expired".to_string())).await?;
                }
            }
        }

        if !is_true {
            self.correlation.clear_pending(&pending_key);
            if let Some(alert) = existing {
                if rule.recovery && matches!(alert.state, AlertState::Open | AlertState::Acknowledged) {
                    let note = format!("condition for rule '{}' cleared", rule.name);
                    Alert::transition(db, alert.id, AlertState::Resolved, "system", Some(note)).await?;
                    return Ok(EvaluationOutcome::Recovered(alert.id));
                }
            }
            return Ok(EvaluationOutcome::ConditionCleared);
        }

        if let Some(alert) = existing {
            Alert::bump_occurrence(db, alert.id).await?;
            return Ok(EvaluationOutcome::Reoccurred(alert.id));
        }

        if rule.delay_seconds == 0 {
            let alert = self.trigger_alert(db, device, rule, context, &correlation_key).await?;
            return Ok(EvaluationOutcome::Triggered(alert.id));
        }

        if !self.correlation.has_pending(&pending_key) {
            self.correlation
                .arm_pending(&pending_key, chrono::Duration::seconds(rule.delay_seconds as i64));
            debug!(rule = %rule.name, device = %device.hostname, "armed pending alert trigger");
            return Ok(EvaluationOutcome::Armed);
        }

        if self.correlation.is_matured(&pending_key) {
            self.correlation.clear_pending(&pending_key);
            let alert = self.trigger_alert(db, device, rule, context, &correlation_key).await?;
            return Ok(EvaluationOutcome::Triggered(alert.id));
        }

        Ok(EvaluationOutcome::Pending)
    }

    async fn trigger_alert(
        &self,
        db: &DatabaseConnection,
        device: &Device,
        rule: &AlertRule,
        context: &Json,
        correlation_key: &str,
    ) -> Result<Alert> {
        let title = render_template(&default_title(rule), device, context);
        let message = render_template(&default_message(rule), device, context);
        let alert = Alert::trigger(
            db,
            rule.id,
            device.id,
            rule.severity,
            title,
            message,
            context.clone(),
            correlation_key.to_string(),
        )
        .await?;
        self.correlation.record(correlation_key, alert.id);
        warn!(rule = %rule.name, device = %device.hostname, alert_id = %alert.id, "alert triggered");
        Ok(alert)
    }

    /// Synthetic-rule counterpart to `evaluate_rule`, used by the
    /// interface and sensor pollers to forward a threshold breach to
    /// the alert engine without an operator-authored `AlertRule`. The
    /// condition is already evaluated by the caller (`is_breached`);
    /// this method only owns delay/recovery/occurrence/correlation
    /// bookkeeping, identical to the rule-driven path.
    #[allow(clippy::too_many_arguments)]
    pub async fn evaluate_breach(
        &self,
        db: &DatabaseConnection,
        rule_id: Uuid,
        device: &Device,
        severity: crate::models::alert_rule::Severity,
        is_breached: bool,
        delay_seconds: u32,
        recovery: bool,
        correlation_suffix: &str,
        title: String,
        message: String,
        details: Json,
    ) -> Result<EvaluationOutcome> {
        let correlation_key = format!("{rule_id}:{}:{correlation_suffix}", device.id);
        let pending_key = format!("pending:{correlation_key}");
        let existing = Alert::find_open_by_correlation_key(db, &correlation_key).await?;

        if let Some(alert) = &existing {
            if alert.state == AlertState::Suppressed {
                if let Some(until) = alert.suppressed_until {
                    if chrono::Utc::now().naive_utc() < until {
                        return Ok(EvaluationOutcome::Pending);
                    }
                    Alert::transition(db, alert.id, AlertState::Open, "evaluator", Some("suppression expired".to_string())).await?;
                }
            }
        }

        if !is_breached {
            self.correlation.clear_pending(&pending_key);
            if let Some(alert) = existing {
                if recovery && matches!(alert.state, AlertState::Open | AlertState::Acknowledged) {
                    let note = format!("breach condition cleared ({correlation_suffix})");
                    Alert::transition(db, alert.id, AlertState::Resolved, "system", Some(note)).await?;
                    return Ok(EvaluationOutcome::Recovered(alert.id));
                }
            }
            return Ok(EvaluationOutcome::ConditionCleared);
        }

        if let Some(alert) = existing {
            Alert::bump_occurrence(db, alert.id).await?;
            return Ok(EvaluationOutcome::Reoccurred(alert.id));
        }

        if delay_seconds == 0 {
            let alert = self
                .trigger_breach(db, rule_id, device.id, severity, title, message, details, &correlation_key)
                .await?;
            return Ok(EvaluationOutcome::Triggered(alert.id));
        }

        if !self.correlation.has_pending(&pending_key) {
            self.correlation
                .arm_pending(&pending_key, chrono::Duration::seconds(delay_seconds as i64));
            debug!(rule = %rule_id, device = %device.hostname, "armed pending synthetic trigger");
            return Ok(EvaluationOutcome::Armed);
        }

        if self.correlation.is_matured(&pending_key) {
            self.correlation.clear_pending(&pending_key);
            let alert = self
                .trigger_breach(db, rule_id, device.id, severity, title, message, details, &correlation_key)
                .await?;
            return Ok(EvaluationOutcome::Triggered(alert.id));
        }

        Ok(EvaluationOutcome::Pending)
    }

    #[allow(clippy::too_many_arguments)]
    async fn trigger_breach(
        &self,
        db: &DatabaseConnection,
        rule_id: Uuid,
        device_id: Uuid,
        severity: crate::models::alert_rule::Severity,
        title: String,
        message: String,
        details: Json,
        correlation_key: &str,
    ) -> Result<Alert> {
        let alert = Alert::trigger(db, rule_id, device_id, severity, title, message, details, correlation_key.to_string()).await?;
        self.correlation.record(correlation_key, alert.id);
        warn!(rule = %rule_id, device_id = %device_id, alert_id = %alert.id, "synthetic alert triggered");
        Ok(alert)
    }

    pub async fn acknowledge(db: &DatabaseConnection, id: Uuid, actor: &str) -> Result<()> {
        Alert::transition(db, id, AlertState::Acknowledged, actor, None).await
    }

    pub async fn resolve(db: &DatabaseConnection, id: Uuid, actor: &str, note: Option<String>) -> Result<()> {
        Alert::transition(db, id, AlertState::Resolved, actor, note).await
    }

    pub async fn suppress(db: &DatabaseConnection, id: Uuid, until: chrono::NaiveDateTime, actor: &str) -> Result<()> {
        Alert::transition(db, id, AlertState::Suppressed, actor, Some(format!("suppressed until {until}"))).await?;
        if let Some(model) = crate::models::entities::prelude::Alerts::find_by_id(id)
            .one(db)
            .await?
        {
            use sea_orm::{ActiveModelTrait, Set};
            let mut active: crate::models::entities::alerts::ActiveModel = model.into();
            active.suppressed_until = Set(Some(until));
            active.update(db).await?;
        }
        Ok(())
    }
}

fn default_title(rule: &AlertRule) -> String {
    rule.translations
        .get("en")
        .and_then(|t| t.get("title"))
        .cloned()
        .unwrap_or_else(|| format!("{} on {{{{device.hostname}}}}", rule.name))
}

fn default_message(rule: &AlertRule) -> String {
    rule.translations
        .get("en")
        .and_then(|t| t.get("message"))
        .cloned()
        .unwrap_or_else(|| format!("Rule \"{}\" matched on {{{{device.hostname}}}}", rule.name))
}

/// Substitutes `{{dotted.path}}` placeholders in `template` against
/// the metric context, falling back to device fields for `device.*`
/// paths not present in the context (e.g. `device.id`).
fn render_template(template: &str, device: &Device, context: &Json) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            break;
        };
        let key = after[..end].trim();
        out.push_str(&resolve_template_value(key, device, context));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn resolve_template_value(key: &str, device: &Device, context: &Json) -> String {
    let mut current = context;
    let mut found = true;
    for segment in key.split('.') {
        match current.as_object().and_then(|o| o.get(segment)) {
            Some(v) => current = v,
            None => {
                found = false;
                break;
            }
        }
    }
    if found {
        return match current {
            Json::String(s) => s.clone(),
            Json::Null => String::new(),
            other => other.to_string(),
        };
    }
    match key {
        "device.hostname" => device.hostname.clone(),
        "device.address" => device.address.clone(),
        "device.id" => device.id.to_string(),
        _ => format!("{{{{{key}}}}}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert_rule::{ConditionOp, ConditionTerm, Conditions};
    use serde_json::json;

    fn sample_rule(delay: u32, recovery: bool) -> AlertRule {
        AlertRule {
            id: Uuid::from_u128(42),
            name: "cpu_critical".to_string(),
            severity: crate::models::alert_rule::Severity::Critical,
            enabled: true,
            device_filter: None,
            conditions: Conditions(vec![ConditionTerm {
                field: "device.cpu".to_string(),
                op: ConditionOp::Gt,
                value: json!(90),
                logical: None,
            }]),
            delay_seconds: delay,
            interval_seconds: 60,
            recovery,
            acknowledgeable: true,
            suppressable: true,
            translations: Default::default(),
        }
    }

    #[test]
    fn renders_hostname_placeholder() {
        let device = Device {
            id: Uuid::from_u128(1),
            hostname: "core-sw-1".to_string(),
            address: "10.0.0.1".to_string(),
            snmp_config: crate::models::device::SnmpConfig::default(),
            os: None,
            vendor: None,
            model: None,
            serial: None,
            uptime: None,
            device_type: None,
            groups: Vec::new(),
            location: None,
            status: crate::models::device::DeviceStatus::Up,
            disabled: false,
            last_polled: None,
            last_discovered: None,
        };
        let ctx = json!({"device": {"cpu": 96}});
        let rendered = render_template("CPU critical on {{device.hostname}}", &device, &ctx);
        assert_eq!(rendered, "CPU critical on core-sw-1");
    }

    #[test]
    fn correlation_key_matches_expected_format() {
        let rule = sample_rule(60, true);
        let device_id = Uuid::from_u128(7);
        assert_eq!(rule.correlation_key(device_id), format!("{}:{}", rule.id, device_id));
    }
}
