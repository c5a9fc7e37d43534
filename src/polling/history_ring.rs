use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use dashmap::DashMap;

/// Bounded per-key ring buffer for the last N samples, used by both
/// pollers for rate calculation and short-horizon queries. Eviction
/// drops the oldest entry on insert at capacity. Non-persistent by
/// design (spec.md §4.6).
#[derive(Clone)]
pub struct HistoryRing<T: Clone> {
    capacity: usize,
    rings: Arc<DashMap<String, VecDeque<T>>>,
}

impl<T: Clone> HistoryRing<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rings: Arc::new(DashMap::new()),
        }
    }

    pub fn push(&self, key: &str, value: T) {
        let mut ring = self.rings.entry(key.to_string()).or_insert_with(VecDeque::new);
        if ring.len() >= self.capacity {
            ring.pop_front();
        }
        ring.push_back(value);
    }

    pub fn latest(&self, key: &str) -> Option<T> {
        self.rings.get(key).and_then(|r| r.back().cloned())
    }

    pub fn previous(&self, key: &str) -> Option<T> {
        self.rings.get(key).and_then(|r| {
            let len = r.len();
            if len >= 2 {
                r.get(len - 2).cloned()
            } else {
                None
            }
        })
    }

    pub fn snapshot(&self, key: &str) -> Vec<T> {
        self.rings.get(key).map(|r| r.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn len(&self, key: &str) -> usize {
        self.rings.get(key).map(|r| r.len()).unwrap_or(0)
    }

    pub fn as_map_lens(&self) -> HashMap<String, usize> {
        self.rings.iter().map(|e| (e.key().clone(), e.value().len())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_at_capacity() {
        let ring: HistoryRing<i32> = HistoryRing::new(3);
        for i in 0..5 {
            ring.push("k", i);
        }
        assert_eq!(ring.snapshot("k"), vec![2, 3, 4]);
        assert_eq!(ring.len("k"), 3);
    }

    #[test]
    fn tracks_latest_and_previous() {
        let ring: HistoryRing<i32> = HistoryRing::new(100);
        ring.push("k", 1);
        ring.push("k", 2);
        assert_eq!(ring.latest("k"), Some(2));
        assert_eq!(ring.previous("k"), Some(1));
    }
}
