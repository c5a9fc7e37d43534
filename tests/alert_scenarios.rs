use serde_json::json;
use uuid::Uuid;

use ymonitor::models::alert_rule::{AlertRule, ConditionOp, ConditionTerm, Conditions, Severity};
use ymonitor::models::device::{Device, DeviceStatus, SnmpConfig};
use ymonitor::models::transport::{NotificationTransport, TransportKind};

fn sample_device() -> Device {
    Device {
        id: Uuid::from_u128(1),
        hostname: "core-sw-1".to_string(),
        address: "10.0.0.1".to_string(),
        snmp_config: SnmpConfig::default(),
        os: None,
        vendor: None,
        model: None,
        serial: None,
        uptime: None,
        device_type: None,
        groups: Vec::new(),
        location: None,
        status: DeviceStatus::Up,
        disabled: false,
        last_polled: None,
        last_discovered: None,
    }
}

fn cpu_critical_rule() -> AlertRule {
    AlertRule {
        id: Uuid::from_u128(42),
        name: "cpu_critical".to_string(),
        severity: Severity::Critical,
        enabled: true,
        device_filter: None,
        conditions: Conditions(vec![ConditionTerm {
            field: "device.cpu".to_string(),
            op: ConditionOp::Gt,
            value: json!(90),
            logical: None,
        }]),
        delay_seconds: 60,
        interval_seconds: 60,
        recovery: true,
        acknowledgeable: true,
        suppressable: true,
        translations: Default::default(),
    }
}

/// Scenario 1 (spec §8): cpu_critical's condition tracks the breach/
/// recovery boundary at exactly the threshold, independent of the
/// evaluator's delay/occurrence bookkeeping (covered separately in
/// `alerts::evaluator`'s own tests).
#[test]
fn cpu_critical_condition_tracks_breach_and_recovery() {
    let rule = cpu_critical_rule();
    let device = sample_device();
    assert!(rule.matches_device(&device));

    assert!(rule.conditions.evaluate(&json!({"device": {"cpu": 95}})));
    assert!(rule.conditions.evaluate(&json!({"device": {"cpu": 96}})));
    assert!(!rule.conditions.evaluate(&json!({"device": {"cpu": 50}})));
    assert!(!rule.conditions.evaluate(&json!({"device": {"cpu": 90}})));
}

/// Scenario 5 (spec §8): a critical alert reaches an unfiltered email
/// transport but not a Slack transport filtered to warning/info only.
#[test]
fn notification_filter_excludes_non_matching_severity() {
    let email = NotificationTransport {
        id: Uuid::from_u128(1),
        name: "ops-email".to_string(),
        kind: TransportKind::Email,
        enabled: true,
        config: json!({"to": "ops@example.invalid"}),
        filter_conditions: None,
    };
    let slack = NotificationTransport {
        id: Uuid::from_u128(2),
        name: "ops-slack".to_string(),
        kind: TransportKind::Slack,
        enabled: true,
        config: json!({}),
        filter_conditions: Some(json!([
            {"field": "severity", "op": "in", "value": ["warning", "info"]}
        ])),
    };

    let alert_context = json!({"severity": "critical", "state": "open"});

    let email_filter_matches = email
        .filter_conditions
        .as_ref()
        .map(|raw| Conditions(serde_json::from_value(raw.clone()).unwrap()).evaluate(&alert_context))
        .unwrap_or(true);
    let slack_filter_matches = slack
        .filter_conditions
        .as_ref()
        .map(|raw| Conditions(serde_json::from_value(raw.clone()).unwrap()).evaluate(&alert_context))
        .unwrap_or(true);

    assert!(email_filter_matches);
    assert!(!slack_filter_matches);
}

/// Rules with a `device_filter` only match devices satisfying it;
/// absence of a filter means every device matches (scenario 1 assumes
/// this implicitly by leaving `device_filter` unset).
#[test]
fn rule_without_device_filter_matches_any_device() {
    let rule = cpu_critical_rule();
    let mut other_device = sample_device();
    other_device.id = Uuid::from_u128(2);
    other_device.hostname = "edge-rtr-1".to_string();
    assert!(rule.matches_device(&other_device));
}
