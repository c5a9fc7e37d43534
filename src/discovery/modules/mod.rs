pub mod core;
pub mod entity;
pub mod ports;
pub mod sensors;
pub mod topology;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discovery::os_template::OsTemplate;
use crate::models::device::Device;
use crate::snmp::transport::SnmpTransport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResult {
    pub success: bool,
    pub module: String,
    pub device_id: Uuid,
    pub discovered: Vec<String>,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Everything a module needs to interrogate a device and persist
/// results, passed by reference so modules stay free of global state
/// per the design notes' "no ambient mutation" rule.
pub struct DiscoveryContext<'a> {
    pub device: &'a Device,
    pub os_template: &'a OsTemplate,
    pub transport: &'a SnmpTransport,
    pub db: &'a DatabaseConnection,
}

#[async_trait]
pub trait DiscoveryModule: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn dependencies(&self) -> &'static [&'static str];
    fn priority(&self) -> u8;
    fn can_discover(&self, device: &Device) -> bool;
    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> ModuleResult;
    fn validate(&self, result: &ModuleResult) -> bool {
        result.success || !result.discovered.is_empty()
    }
}

pub fn all_modules() -> Vec<Box<dyn DiscoveryModule>> {
    vec![
        Box::new(core::CoreModule),
        Box::new(ports::PortsModule),
        Box::new(sensors::SensorsModule),
        Box::new(entity::EntityModule),
        Box::new(topology::TopologyModule),
    ]
}
