use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

const RETENTION: Duration = Duration::hours(24);

#[derive(Debug, Clone)]
struct CorrelatedEntry {
    alert_ids: Vec<Uuid>,
    last_seen: DateTime<Utc>,
}

/// Process-scoped correlation map keyed by `correlation_key`, used by
/// the notification dispatcher for grouping/digesting per spec.md
/// §4.7. Entries older than 24h are pruned lazily. Also doubles as the
/// per-`(rule, device)` pending-trigger map for `delay_s` handling.
#[derive(Clone, Default)]
pub struct CorrelationMap {
    groups: Arc<DashMap<String, CorrelatedEntry>>,
    pending_triggers: Arc<DashMap<String, DateTime<Utc>>>,
}

impl CorrelationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, correlation_key: &str, alert_id: Uuid) {
        let mut entry = self.groups.entry(correlation_key.to_string()).or_insert_with(|| CorrelatedEntry {
            alert_ids: Vec::new(),
            last_seen: Utc::now(),
        });
        if !entry.alert_ids.contains(&alert_id) {
            entry.alert_ids.push(alert_id);
        }
        entry.last_seen = Utc::now();
    }

    pub fn group(&self, correlation_key: &str) -> Vec<Uuid> {
        self.groups.get(correlation_key).map(|e| e.alert_ids.clone()).unwrap_or_default()
    }

    pub fn prune_expired(&self) {
        let now = Utc::now();
        self.groups.retain(|_, e| now - e.last_seen < RETENTION);
    }

    /// Records a pending (delayed) trigger for `(rule_id, device_id)`
    /// expiring at `now + delay`. Returns whether a prior true
    /// evaluation has now matured (expiry reached).
    pub fn arm_pending(&self, key: &str, delay: chrono::Duration) {
        self.pending_triggers.insert(key.to_string(), Utc::now() + delay);
    }

    pub fn is_matured(&self, key: &str) -> bool {
        self.pending_triggers
            .get(key)
            .map(|expiry| Utc::now() >= *expiry)
            .unwrap_or(false)
    }

    pub fn has_pending(&self, key: &str) -> bool {
        self.pending_triggers.contains_key(key)
    }

    pub fn clear_pending(&self, key: &str) {
        self.pending_triggers.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_alerts_sharing_a_key() {
        let map = CorrelationMap::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        map.record("rule:device", a);
        map.record("rule:device", b);
        assert_eq!(map.group("rule:device").len(), 2);
    }

    #[test]
    fn pending_trigger_not_matured_immediately() {
        let map = CorrelationMap::new();
        map.arm_pending("rule:device", chrono::Duration::seconds(60));
        assert!(map.has_pending("rule:device"));
        assert!(!map.is_matured("rule:device"));
    }

    #[test]
    fn pending_trigger_matures_with_zero_delay() {
        let map = CorrelationMap::new();
        map.arm_pending("rule:device", chrono::Duration::seconds(0));
        assert!(map.is_matured("rule:device"));
    }
}
