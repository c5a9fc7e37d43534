use sea_orm::DatabaseConnection;
use serde_json::{json, Value as Json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::alert::Alert;
use crate::models::alert_rule::{ConditionTerm, Conditions};
use crate::models::notification::AlertNotification;
use crate::models::transport::NotificationTransport;
use crate::notify::templates::template_vars;
use crate::notify::transports::adapter_for;

/// Resolves the applicable transport set and fans an alert out to
/// each, per spec.md §4.8. Returns the number of transports the
/// dispatcher attempted (successes and failures both count).
pub async fn send_alert_notifications(
    db: &DatabaseConnection,
    alert: &Alert,
    transport_ids: Option<&[Uuid]>,
) -> Result<usize> {
    let transports = NotificationTransport::list_enabled(db).await?;
    let context = json!({
        "severity": alert.severity.as_str(),
        "state": alert.state.as_str(),
        "device_id": alert.device_id.to_string(),
        "rule_id": alert.rule_id.to_string(),
    });

    let applicable: Vec<NotificationTransport> = transports
        .into_iter()
        .filter(|t| transport_ids.map(|ids| ids.contains(&t.id)).unwrap_or(true))
        .filter(|t| matches_filter(t, &context))
        .collect();

    let vars = template_vars(alert);
    let mut dispatched = 0usize;
    for transport in &applicable {
        let notification = AlertNotification::create_pending(db, alert.id, transport.id).await?;
        let adapter = adapter_for(transport.kind);
        let outcome = adapter.send(transport, alert, &vars).await;
        match &outcome {
            Ok(_) => info!(transport = %transport.name, alert = %alert.id, "notification delivered"),
            Err(reason) => warn!(transport = %transport.name, alert = %alert.id, reason, "notification failed"),
        }
        AlertNotification::record_attempt(db, notification.id, outcome).await?;
        Alert::mark_notified(db, alert.id).await?;
        dispatched += 1;
    }
    Ok(dispatched)
}

/// Evaluates `filter_conditions` against `{severity, state, device_id,
/// rule_id}`, restricted in practice to `eq, ne, in, not_in` per
/// spec.md §4.8. A missing or malformed filter matches everything.
fn matches_filter(transport: &NotificationTransport, context: &Json) -> bool {
    let Some(raw) = &transport.filter_conditions else {
        return true;
    };
    match serde_json::from_value::<Vec<ConditionTerm>>(raw.clone()) {
        Ok(terms) => Conditions(terms).evaluate(context),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert_rule::ConditionOp;
    use serde_json::json;

    fn sample_transport(filter: Option<Json>) -> NotificationTransport {
        NotificationTransport {
            id: Uuid::from_u128(1),
            name: "ops-slack".to_string(),
            kind: crate::models::transport::TransportKind::Slack,
            enabled: true,
            config: json!({}),
            filter_conditions: filter,
        }
    }

    #[test]
    fn missing_filter_matches_everything() {
        let transport = sample_transport(None);
        let ctx = json!({"severity": "critical"});
        assert!(matches_filter(&transport, &ctx));
    }

    #[test]
    fn filter_restricts_by_severity() {
        let filter = json!([{"field": "severity", "op": "eq", "value": "critical"}]);
        let transport = sample_transport(Some(filter));
        assert!(matches_filter(&transport, &json!({"severity": "critical"})));
        assert!(!matches_filter(&transport, &json!({"severity": "warning"})));
    }

    #[test]
    fn condition_op_in_is_supported_by_filter_evaluation() {
        let terms = vec![ConditionTerm {
            field: "severity".to_string(),
            op: ConditionOp::In,
            value: json!(["critical", "warning"]),
            logical: None,
        }];
        assert!(Conditions(terms).evaluate(&json!({"severity": "warning"})));
    }
}
