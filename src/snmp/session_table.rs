use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::models::device::{SnmpTransportKind, SnmpVersion};

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SessionKey {
    pub address: String,
    pub port: u16,
    pub version: SnmpVersionKey,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum SnmpVersionKey {
    V1,
    V2c,
    V3,
}

impl From<SnmpVersion> for SnmpVersionKey {
    fn from(v: SnmpVersion) -> Self {
        match v {
            SnmpVersion::V1 => SnmpVersionKey::V1,
            SnmpVersion::V2c => SnmpVersionKey::V2c,
            SnmpVersion::V3 => SnmpVersionKey::V3,
        }
    }
}

impl SessionKey {
    pub fn new(address: &str, port: u16, version: SnmpVersion) -> Self {
        Self {
            address: address.to_string(),
            port,
            version: version.into(),
        }
    }
}

/// Per-device SNMP session state: a monotonically increasing request id
/// and the last-used timestamp, reused across requests to the same
/// (address, port, version) the way a real SNMP stack keeps one socket
/// warm per peer instead of opening one per request.
pub struct SnmpSession {
    next_request_id: AtomicI32,
    pub last_used: std::sync::Mutex<Instant>,
    pub transport_kind: SnmpTransportKind,
}

impl SnmpSession {
    fn new(transport_kind: SnmpTransportKind) -> Self {
        Self {
            next_request_id: AtomicI32::new(1),
            last_used: std::sync::Mutex::new(Instant::now()),
            transport_kind,
        }
    }

    pub fn next_request_id(&self) -> i32 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn touch(&self) {
        *self.last_used.lock().unwrap() = Instant::now();
    }
}

/// Process-scoped session table, shared across the poller/discovery
/// worker pool via `Arc`. Concurrent reads/inserts are lock-free at the
/// map level; per-session mutation is guarded by the session's own
/// atomics/mutex, matching the mutual-exclusion-region design.
#[derive(Clone, Default)]
pub struct SessionTable {
    sessions: Arc<DashMap<SessionKey, Arc<SnmpSession>>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn get_or_create(&self, key: SessionKey, transport_kind: SnmpTransportKind) -> Arc<SnmpSession> {
        let session = self
            .sessions
            .entry(key)
            .or_insert_with(|| Arc::new(SnmpSession::new(transport_kind)));
        session.touch();
        session.clone()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops sessions idle longer than `max_idle`, called periodically
    /// by the scheduler's housekeeping job.
    pub fn evict_idle(&self, max_idle: std::time::Duration) {
        self.sessions
            .retain(|_, session| session.last_used.lock().unwrap().elapsed() < max_idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_session_for_same_key() {
        let table = SessionTable::new();
        let key = SessionKey::new("10.0.0.1", 161, SnmpVersion::V2c);
        let a = table.get_or_create(key.clone(), SnmpTransportKind::Udp);
        let b = table.get_or_create(key, SnmpTransportKind::Udp);
        assert_eq!(a.next_request_id(), 1);
        assert_eq!(b.next_request_id(), 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn evicts_idle_sessions() {
        let table = SessionTable::new();
        let key = SessionKey::new("10.0.0.2", 161, SnmpVersion::V2c);
        table.get_or_create(key, SnmpTransportKind::Udp);
        table.evict_idle(std::time::Duration::from_secs(0));
        assert!(table.is_empty());
    }
}
