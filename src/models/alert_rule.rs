use sea_orm::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Result, YmError};
use crate::models::entities::{alert_rules, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "critical" => Self::Critical,
            "warning" => Self::Warning,
            "ok" => Self::Ok,
            _ => Self::Info,
        }
    }
}

/// Device filter, per spec.md §4.7: every non-empty field must match
/// (or, if `exclude=true`, must NOT match) for the rule to apply to a
/// device. A missing/empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceFilter {
    #[serde(default)]
    pub hostname: Vec<String>,
    #[serde(default)]
    pub ip: Vec<String>,
    #[serde(default)]
    pub os: Vec<String>,
    #[serde(default)]
    pub r#type: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub location: Vec<String>,
    #[serde(default)]
    pub exclude: bool,
}

impl DeviceFilter {
    fn field_matches(patterns: &[String], value: Option<&str>, regex: bool) -> bool {
        if patterns.is_empty() {
            return true;
        }
        let Some(value) = value else { return false };
        patterns.iter().any(|p| {
            if regex {
                regex::RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map(|re| re.is_match(value))
                    .unwrap_or(false)
            } else {
                p == value
            }
        })
    }

    fn groups_match(patterns: &[String], device_groups: &[String]) -> bool {
        if patterns.is_empty() {
            return true;
        }
        patterns.iter().any(|p| device_groups.iter().any(|g| g == p))
    }

    pub fn matches(&self, device: &crate::models::device::Device) -> bool {
        let checks = Self::field_matches(&self.hostname, Some(&device.hostname), true)
            && Self::field_matches(&self.ip, Some(&device.address), false)
            && Self::field_matches(&self.os, device.os.as_deref(), false)
            && Self::field_matches(&self.r#type, device.device_type.as_deref(), false)
            && Self::groups_match(&self.groups, &device.groups)
            && Self::field_matches(&self.location, device.location.as_deref(), false);
        if self.exclude {
            !checks
        } else {
            checks
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOp {
    And,
    Or,
}

/// One term in the linear condition sequence. The first term's
/// `logical` is ignored; subsequent terms combine left-associatively
/// with the previous accumulator, per spec.md §4.7 (deliberately no
/// precedence override — see the open-question resolution in
/// DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionTerm {
    pub field: String,
    pub op: ConditionOp,
    pub value: Json,
    #[serde(default)]
    pub logical: Option<BoolOp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conditions(pub Vec<ConditionTerm>);

fn resolve_path<'a>(root: &'a Json, path: &str) -> Option<&'a Json> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn as_f64(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn stringify(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

fn evaluate_term(term: &ConditionTerm, context: &Json) -> bool {
    let Some(resolved) = resolve_path(context, &term.field) else {
        return false;
    };
    match term.op {
        ConditionOp::Eq => resolved == &term.value,
        ConditionOp::Ne => resolved != &term.value,
        ConditionOp::Gt | ConditionOp::Gte | ConditionOp::Lt | ConditionOp::Lte => {
            match (as_f64(resolved), as_f64(&term.value)) {
                (Some(lhs), Some(rhs)) => match term.op {
                    ConditionOp::Gt => lhs > rhs,
                    ConditionOp::Gte => lhs >= rhs,
                    ConditionOp::Lt => lhs < rhs,
                    ConditionOp::Lte => lhs <= rhs,
                    _ => unreachable!(),
                },
                _ => false,
            }
        }
        ConditionOp::Like | ConditionOp::NotLike => {
            let haystack = stringify(resolved).to_lowercase();
            let needle = stringify(&term.value).to_lowercase();
            let contains = !needle.is_empty() && haystack.contains(&needle);
            if term.op == ConditionOp::Like {
                contains
            } else {
                !contains
            }
        }
        ConditionOp::In | ConditionOp::NotIn => {
            let contains = term
                .value
                .as_array()
                .map(|arr| arr.iter().any(|v| v == resolved))
                .unwrap_or(false);
            if term.op == ConditionOp::In {
                contains
            } else {
                !contains
            }
        }
    }
}

impl Conditions {
    pub fn evaluate(&self, context: &Json) -> bool {
        let mut terms = self.0.iter();
        let Some(first) = terms.next() else { return false };
        let mut acc = evaluate_term(first, context);
        for term in terms {
            let v = evaluate_term(term, context);
            acc = match term.logical.unwrap_or(BoolOp::And) {
                BoolOp::And => acc && v,
                BoolOp::Or => acc || v,
            };
        }
        acc
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: Uuid,
    pub name: String,
    pub severity: Severity,
    pub enabled: bool,
    pub device_filter: Option<DeviceFilter>,
    pub conditions: Conditions,
    pub delay_seconds: u32,
    pub interval_seconds: u32,
    pub recovery: bool,
    pub acknowledgeable: bool,
    pub suppressable: bool,
    pub translations: HashMap<String, HashMap<String, String>>,
}

impl TryFrom<alert_rules::Model> for AlertRule {
    type Error = YmError;

    fn try_from(m: alert_rules::Model) -> Result<Self> {
        let device_filter = match m.device_filter {
            Some(v) => Some(
                serde_json::from_value(v)
                    .map_err(|e| YmError::Internal(format!("bad device_filter on rule {}: {e}", m.id)))?,
            ),
            None => None,
        };
        let terms: Vec<ConditionTerm> = serde_json::from_value(m.conditions)
            .map_err(|e| YmError::Internal(format!("bad conditions on rule {}: {e}", m.id)))?;
        let translations = serde_json::from_value(m.translations).unwrap_or_default();
        Ok(Self {
            id: m.id,
            name: m.name,
            severity: Severity::parse(&m.severity),
            enabled: m.enabled,
            device_filter,
            conditions: Conditions(terms),
            delay_seconds: m.delay_seconds.max(0) as u32,
            interval_seconds: m.interval_seconds.max(0) as u32,
            recovery: m.recovery,
            acknowledgeable: m.acknowledgeable,
            suppressable: m.suppressable,
            translations,
        })
    }
}

impl AlertRule {
    pub async fn list_enabled(db: &DatabaseConnection) -> Result<Vec<AlertRule>> {
        let models = AlertRules::find()
            .filter(alert_rules::Column::Enabled.eq(true))
            .all(db)
            .await?;
        models.into_iter().map(AlertRule::try_from).collect()
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<AlertRule>> {
        match AlertRules::find_by_id(id).one(db).await? {
            Some(m) => Ok(Some(AlertRule::try_from(m)?)),
            None => Ok(None),
        }
    }

    /// Refuses to delete a rule that still owns open or acknowledged
    /// alerts, per spec.md §3's ownership invariant.
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<()> {
        use crate::models::entities::alerts;

        let open_count = Alerts::find()
            .filter(alerts::Column::RuleId.eq(id))
            .filter(alerts::Column::State.is_in(["open", "acknowledged"]))
            .count(db)
            .await?;
        if open_count > 0 {
            return Err(YmError::Conflict(format!(
                "rule {id} still owns {open_count} open/acknowledged alert(s)"
            )));
        }
        AlertRules::delete_by_id(id).exec(db).await?;
        Ok(())
    }

    pub fn matches_device(&self, device: &crate::models::device::Device) -> bool {
        match &self.device_filter {
            Some(filter) => filter.matches(device),
            None => true,
        }
    }

    pub fn correlation_key(&self, device_id: Uuid) -> String {
        format!("{}:{}", self.id, device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn left_associative_and_or() {
        // cpu > 90 AND mem > 50 OR status == "down"
        let conditions = Conditions(vec![
            ConditionTerm {
                field: "cpu".to_string(),
                op: ConditionOp::Gt,
                value: json!(90),
                logical: None,
            },
            ConditionTerm {
                field: "mem".to_string(),
                op: ConditionOp::Gt,
                value: json!(50),
                logical: Some(BoolOp::And),
            },
            ConditionTerm {
                field: "status".to_string(),
                op: ConditionOp::Eq,
                value: json!("down"),
                logical: Some(BoolOp::Or),
            },
        ]);
        // cpu fails, mem fails -> false, OR status=="down" -> true
        let ctx = json!({"cpu": 10, "mem": 10, "status": "down"});
        assert!(conditions.evaluate(&ctx));
        let ctx2 = json!({"cpu": 10, "mem": 10, "status": "up"});
        assert!(!conditions.evaluate(&ctx2));
    }

    #[test]
    fn unresolved_path_fails() {
        let conditions = Conditions(vec![ConditionTerm {
            field: "device.cpu".to_string(),
            op: ConditionOp::Gt,
            value: json!(90),
            logical: None,
        }]);
        assert!(!conditions.evaluate(&json!({})));
    }
}
