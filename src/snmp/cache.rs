use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dashmap::DashMap;

use crate::snmp::pdu::Varbind;

#[derive(Clone)]
struct CacheEntry {
    inserted_at: Instant,
    varbinds: Vec<Varbind>,
}

/// TTL cache over SNMP read results, keyed on a base64 digest of the
/// device identity plus operation shape, per spec.md §4.1's caching
/// requirement. Hit/miss counters are exposed for the operational
/// surface's diagnostics.
#[derive(Clone)]
pub struct SnmpCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl SnmpCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn key(device_address: &str, op: &str, oids: &[String]) -> String {
        let mut sorted: Vec<&str> = oids.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let raw = format!("{device_address}|{op}|{}", sorted.join(","));
        STANDARD.encode(raw.as_bytes())
    }

    pub fn get(&self, key: &str) -> Option<Vec<Varbind>> {
        let hit = self.entries.get(key).and_then(|entry| {
            if entry.inserted_at.elapsed() < self.ttl {
                Some(entry.varbinds.clone())
            } else {
                None
            }
        });
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    pub fn put(&self, key: String, varbinds: Vec<Varbind>) {
        self.entries.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                varbinds,
            },
        );
    }

    /// Invalidates every cached entry for a device, called after a
    /// successful SET against it.
    pub fn invalidate_device(&self, device_address: &str) {
        let prefix = format!("{device_address}|");
        self.entries.retain(|key, _| {
            STANDARD
                .decode(key)
                .map(|raw| !String::from_utf8_lossy(&raw).starts_with(&prefix))
                .unwrap_or(true)
        });
    }

    /// Invalidates every cached entry whose OID set includes one
    /// starting with `prefix`, e.g. after a discovery module learns a
    /// subtree has changed shape.
    pub fn invalidate_by_oid(&self, prefix: &str) {
        self.entries.retain(|key, _| {
            STANDARD
                .decode(key)
                .ok()
                .and_then(|raw| String::from_utf8(raw).ok())
                .map(|decoded| {
                    decoded
                        .splitn(3, '|')
                        .nth(2)
                        .map(|oids| !oids.split(',').any(|oid| oid.starts_with(prefix)))
                        .unwrap_or(true)
                })
                .unwrap_or(true)
        });
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::pdu::RawValue;

    #[test]
    fn caches_and_expires() {
        let cache = SnmpCache::new(Duration::from_millis(20));
        let key = SnmpCache::key("10.0.0.1", "get", &["1.3.6.1.2.1.1.1.0".to_string()]);
        assert!(cache.get(&key).is_none());
        cache.put(
            key.clone(),
            vec![Varbind {
                oid: "1.3.6.1.2.1.1.1.0".to_string(),
                value: RawValue::Null,
            }],
        );
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.hit_count(), 1);
        assert_eq!(cache.miss_count(), 1);
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn invalidate_device_clears_its_entries() {
        let cache = SnmpCache::new(Duration::from_secs(60));
        let key = SnmpCache::key("10.0.0.1", "get", &["1.3.6.1.2.1.1.1.0".to_string()]);
        cache.put(key.clone(), vec![]);
        cache.invalidate_device("10.0.0.1");
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn key_is_order_independent() {
        let a = SnmpCache::key("10.0.0.1", "get", &["1.3.6.1.2.1.1.3.0".to_string(), "1.3.6.1.2.1.1.1.0".to_string()]);
        let b = SnmpCache::key("10.0.0.1", "get", &["1.3.6.1.2.1.1.1.0".to_string(), "1.3.6.1.2.1.1.3.0".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn invalidate_by_oid_clears_matching_entries() {
        let cache = SnmpCache::new(Duration::from_secs(60));
        let matching = SnmpCache::key("10.0.0.1", "walk", &["1.3.6.1.2.1.2.2.1.2".to_string()]);
        let other = SnmpCache::key("10.0.0.1", "get", &["1.3.6.1.2.1.1.1.0".to_string()]);
        cache.put(matching.clone(), vec![]);
        cache.put(other.clone(), vec![]);
        cache.invalidate_by_oid("1.3.6.1.2.1.2.2");
        assert!(cache.get(&matching).is_none());
        assert!(cache.get(&other).is_some());
    }
}
