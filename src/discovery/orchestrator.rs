use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::discovery::modules::{all_modules, DiscoveryContext, DiscoveryModule};
use crate::discovery::os_template;
use crate::discovery::session::{DiscoverySession, SessionStatus, SessionType};
use crate::error::{Result, YmError};
use crate::models::device::Device;
use crate::snmp::transport::SnmpTransport;

const SESSION_RETENTION: Duration = Duration::hours(24);
const INCREMENTAL_MODULES: &[&str] = &["sensors", "ports", "topology"];

/// Discovery orchestrator (component E): owns the process-scoped
/// session table, resolves OS templates, and runs modules in
/// dependency/priority order for one device at a time.
#[derive(Clone)]
pub struct DiscoveryOrchestrator {
    sessions: Arc<DashMap<Uuid, DiscoverySession>>,
    transport: SnmpTransport,
}

impl DiscoveryOrchestrator {
    pub fn new(transport: SnmpTransport) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            transport,
        }
    }

    pub fn get_available_modules(&self) -> Vec<&'static str> {
        all_modules().iter().map(|m| m.name()).collect()
    }

    pub fn get_session(&self, id: Uuid) -> Option<DiscoverySession> {
        self.sessions.get(&id).map(|s| s.clone())
    }

    pub fn cancel(&self, id: Uuid) -> bool {
        if let Some(session) = self.sessions.get(&id) {
            session.cancel();
            true
        } else {
            false
        }
    }

    pub fn prune_expired(&self) {
        self.sessions.retain(|_, session| match session.ended_at {
            Some(ended) => Utc::now() - ended < SESSION_RETENTION,
            None => true,
        });
    }

    pub async fn detect_os(&self, db: &DatabaseConnection, device: &Device) -> Result<os_template::OsDetection> {
        let varbinds = self
            .transport
            .get(
                &device.address,
                &device.snmp_config,
                &["1.3.6.1.2.1.1.2.0".to_string(), "1.3.6.1.2.1.1.1.0".to_string()],
            )
            .await?;
        let _ = db;
        let sys_object_id = varbinds
            .iter()
            .find(|v| v.oid == "1.3.6.1.2.1.1.2.0")
            .map(|v| v.value.as_display_string());
        let sys_descr = varbinds
            .iter()
            .find(|v| v.oid == "1.3.6.1.2.1.1.1.0")
            .map(|v| v.value.as_display_string());
        Ok(os_template::detect_os(sys_object_id.as_deref(), sys_descr.as_deref()))
    }

    async fn run(
        &self,
        db: &DatabaseConnection,
        device: &Device,
        session_type: SessionType,
        module_names: Option<Vec<String>>,
    ) -> Result<Uuid> {
        // Connectivity probe before any module runs, per spec.md §4.5's
        // failure policy.
        if self.transport.test_connection(&device.address, &device.snmp_config).await.is_err() {
            let mut session = DiscoverySession::new(device.id, session_type, Vec::new());
            session.errors.push("device unreachable at discovery start".to_string());
            session.finish(SessionStatus::Failed);
            let id = session.id;
            self.sessions.insert(id, session);
            return Err(YmError::Unreachable {
                device_id: device.id.to_string(),
            });
        }

        let os = device.os.clone().unwrap_or_else(|| "generic".to_string());
        let template = os_template::load(&os);

        let all = all_modules();
        let mut selected: Vec<&Box<dyn DiscoveryModule>> = match &module_names {
            Some(names) => all.iter().filter(|m| names.contains(&m.name().to_string())).collect(),
            None => all.iter().collect(),
        };
        selected.sort_by_key(|m| m.priority());
        let selected_names: Vec<String> = selected.iter().map(|m| m.name().to_string()).collect();

        let session = DiscoverySession::new(device.id, session_type, selected_names.clone());
        let session_id = session.id;
        self.sessions.insert(session_id, session.clone());

        let mut succeeded_modules: Vec<&str> = Vec::new();
        let total = selected.len().max(1);

        for (i, module) in selected.iter().enumerate() {
            if self.sessions.get(&session_id).map(|s| s.is_cancelled()).unwrap_or(false) {
                if let Some(mut s) = self.sessions.get_mut(&session_id) {
                    s.finish(SessionStatus::Cancelled);
                }
                return Ok(session_id);
            }

            if !module.dependencies().iter().all(|dep| succeeded_modules.contains(dep)) {
                warn!(module = module.name(), device_id = %device.id, "skipping module: unmet dependencies");
                continue;
            }
            if !module.can_discover(device) {
                continue;
            }

            if let Some(mut s) = self.sessions.get_mut(&session_id) {
                s.current_module = Some(module.name().to_string());
                s.progress = ((i as f32 / total as f32) * 100.0) as u8;
            }

            let ctx = DiscoveryContext {
                device,
                os_template: &template,
                transport: &self.transport,
                db,
            };
            let result = module.discover(&ctx).await;
            info!(module = module.name(), device_id = %device.id, success = result.success, "discovery module finished");

            if result.success {
                succeeded_modules.push(module.name());
            }
            if let Some(mut s) = self.sessions.get_mut(&session_id) {
                s.errors.extend(result.errors.clone());
                s.results.push(result);
            }
        }

        if let Some(mut s) = self.sessions.get_mut(&session_id) {
            let status = if succeeded_modules.is_empty() && !selected.is_empty() {
                SessionStatus::Failed
            } else {
                SessionStatus::Completed
            };
            s.finish(status);
        }
        Ok(session_id)
    }

    pub async fn discover_device(
        &self,
        db: &DatabaseConnection,
        device: &Device,
        modules: Option<Vec<String>>,
    ) -> Result<Uuid> {
        self.run(db, device, SessionType::Full, modules).await
    }

    pub async fn incremental(&self, db: &DatabaseConnection, device: &Device) -> Result<Uuid> {
        self.run(
            db,
            device,
            SessionType::Incremental,
            Some(INCREMENTAL_MODULES.iter().map(|s| s.to_string()).collect()),
        )
        .await
    }
}
