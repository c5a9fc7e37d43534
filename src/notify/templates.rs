use serde_json::Value as Json;

use crate::models::alert::Alert;

/// Builds the template variable set the notification dispatcher
/// substitutes into transport-specific bodies, per spec.md §4.8:
/// `{id, title, message, severity, state, device_id, timestamp,
/// occurrences}` plus every key under `alert.details`.
pub fn template_vars(alert: &Alert) -> Json {
    let mut vars = serde_json::json!({
        "id": alert.id.to_string(),
        "title": alert.title,
        "message": alert.message,
        "severity": alert.severity.as_str(),
        "state": alert.state.as_str(),
        "device_id": alert.device_id.to_string(),
        "timestamp": alert.last_occurred.to_string(),
        "occurrences": alert.occurrences,
    });
    if let Some(details) = alert.details.as_object() {
        if let Some(obj) = vars.as_object_mut() {
            for (key, value) in details {
                obj.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
    vars
}

/// Substitutes `{key}` placeholders against a flat variable map,
/// rendering missing keys as empty strings per spec.md §4.8.
pub fn render(template: &str, vars: &Json) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            break;
        };
        let key = after[..end].trim();
        let value = vars
            .as_object()
            .and_then(|o| o.get(key))
            .map(|v| match v {
                Json::String(s) => s.clone(),
                Json::Null => String::new(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_known_and_missing_keys() {
        let vars = serde_json::json!({"severity": "critical"});
        assert_eq!(render("sev={severity} other={missing}", &vars), "sev=critical other=");
    }
}
