use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::discovery::orchestrator::DiscoveryOrchestrator;
use crate::discovery::os_template::OsDetection;
use crate::discovery::DiscoverySession;
#[cfg(test)]
use crate::discovery::SessionType;
use crate::error::{Result, YmError};
use crate::models::device::Device;

/// Operator-facing wrapper around `DiscoveryOrchestrator`, grounded on
/// the operational surface contract in spec.md §6 (`start_discovery`,
/// `get_session`, `cancel_session`, `detect_os`).
pub struct DiscoveryService {
    db: DatabaseConnection,
    orchestrator: DiscoveryOrchestrator,
}

impl DiscoveryService {
    pub fn new(db: DatabaseConnection, orchestrator: DiscoveryOrchestrator) -> Self {
        Self { db, orchestrator }
    }

    pub fn available_modules(&self) -> Vec<&'static str> {
        self.orchestrator.get_available_modules()
    }

    async fn load_device(&self, device_id: Uuid) -> Result<Device> {
        Device::find_by_id(&self.db, device_id)
            .await?
            .ok_or_else(|| YmError::NotFound { kind: "device", id: device_id.to_string() })
    }

    /// Starts a fresh session every call, even for the same device;
    /// the device inventory this converges to is idempotent even
    /// though the session set itself grows, per spec.md §8.
    pub async fn start_discovery(&self, device_id: Uuid, modules: Option<Vec<String>>) -> Result<Uuid> {
        let device = self.load_device(device_id).await?;
        match &modules {
            Some(names) if !names.is_empty() => self.orchestrator.discover_device(&self.db, &device, Some(names.clone())).await,
            Some(_) => self.orchestrator.discover_device(&self.db, &device, None).await,
            None => self.orchestrator.discover_device(&self.db, &device, None).await,
        }
    }

    pub async fn start_incremental(&self, device_id: Uuid) -> Result<Uuid> {
        let device = self.load_device(device_id).await?;
        self.orchestrator.incremental(&self.db, &device).await
    }

    pub fn get_session(&self, session_id: Uuid) -> Result<DiscoverySession> {
        self.orchestrator
            .get_session(session_id)
            .ok_or_else(|| YmError::NotFound { kind: "discovery_session", id: session_id.to_string() })
    }

    pub fn cancel_session(&self, session_id: Uuid) -> Result<()> {
        if self.orchestrator.cancel(session_id) {
            Ok(())
        } else {
            Err(YmError::NotFound { kind: "discovery_session", id: session_id.to_string() })
        }
    }

    pub fn prune_expired_sessions(&self) {
        self.orchestrator.prune_expired();
    }

    pub async fn detect_os(&self, device_id: Uuid) -> Result<OsDetection> {
        let device = self.load_device(device_id).await?;
        self.orchestrator.detect_os(&self.db, &device).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_type_variants_are_distinct() {
        assert_ne!(SessionType::Full, SessionType::Incremental);
    }
}
