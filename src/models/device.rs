use chrono::NaiveDateTime;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, YmError};
use crate::models::entities::{devices, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnmpVersion {
    V1,
    V2c,
    V3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnmpTransportKind {
    Udp,
    Tcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthLevel {
    None,
    Auth,
    AuthPriv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthProtocol {
    MD5,
    SHA,
    SHA224,
    SHA256,
    SHA384,
    SHA512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivProtocol {
    DES,
    AES,
    AES192,
    AES256,
    #[serde(rename = "3DES")]
    TripleDES,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnmpConfig {
    pub version: SnmpVersion,
    pub port: u16,
    pub timeout_ms: u32,
    pub retries: u8,
    pub transport: SnmpTransportKind,
    pub community: Option<String>,
    pub username: Option<String>,
    pub auth_level: Option<AuthLevel>,
    pub auth_protocol: Option<AuthProtocol>,
    pub auth_secret: Option<String>,
    pub priv_protocol: Option<PrivProtocol>,
    pub priv_secret: Option<String>,
    pub context: Option<String>,
}

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            version: SnmpVersion::V2c,
            port: 161,
            timeout_ms: 3000,
            retries: 2,
            transport: SnmpTransportKind::Udp,
            community: Some("public".to_string()),
            username: None,
            auth_level: None,
            auth_protocol: None,
            auth_secret: None,
            priv_protocol: None,
            priv_secret: None,
            context: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Up,
    Down,
    Warning,
    Unknown,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Up => "up",
            DeviceStatus::Down => "down",
            DeviceStatus::Warning => "warning",
            DeviceStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "up" => DeviceStatus::Up,
            "down" => DeviceStatus::Down,
            "warning" => DeviceStatus::Warning,
            _ => DeviceStatus::Unknown,
        }
    }
}

/// Domain-level device record, decoupled from the sea-orm `Model` the
/// way the teacher decouples `Operation` from `operations::Model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub hostname: String,
    pub address: String,
    pub snmp_config: SnmpConfig,
    pub os: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub uptime: Option<u64>,
    pub device_type: Option<String>,
    pub groups: Vec<String>,
    pub location: Option<String>,
    pub status: DeviceStatus,
    pub disabled: bool,
    pub last_polled: Option<NaiveDateTime>,
    pub last_discovered: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceRequest {
    pub hostname: String,
    pub address: String,
    pub snmp_config: SnmpConfig,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl TryFrom<devices::Model> for Device {
    type Error = YmError;

    fn try_from(model: devices::Model) -> Result<Self> {
        let snmp_config: SnmpConfig = serde_json::from_value(model.snmp_config)
            .map_err(|e| YmError::Internal(format!("corrupt snmp_config for device {}: {e}", model.id)))?;
        let groups: Vec<String> = serde_json::from_value(model.groups)
            .map_err(|e| YmError::Internal(format!("corrupt groups for device {}: {e}", model.id)))?;
        Ok(Self {
            id: model.id,
            hostname: model.hostname,
            address: model.address,
            snmp_config,
            os: model.os,
            vendor: model.vendor,
            model: model.model,
            serial: model.serial,
            uptime: model.uptime.map(|u| u as u64),
            device_type: model.device_type,
            groups,
            location: model.location,
            status: DeviceStatus::parse(&model.status),
            disabled: model.disabled,
            last_polled: model.last_polled,
            last_discovered: model.last_discovered,
        })
    }
}

impl Device {
    pub async fn create(db: &DatabaseConnection, req: CreateDeviceRequest) -> Result<Device> {
        let now = chrono::Utc::now().naive_utc();
        let config_json = serde_json::to_value(&req.snmp_config)
            .map_err(|e| YmError::Internal(e.to_string()))?;
        let groups_json = serde_json::to_value(&req.groups).map_err(|e| YmError::Internal(e.to_string()))?;
        let active = devices::ActiveModel {
            id: Set(Uuid::new_v4()),
            hostname: Set(req.hostname),
            address: Set(req.address),
            snmp_config: Set(config_json),
            os: Set(None),
            vendor: Set(None),
            model: Set(None),
            serial: Set(None),
            uptime: Set(None),
            device_type: Set(req.device_type),
            groups: Set(groups_json),
            location: Set(req.location),
            status: Set(DeviceStatus::Unknown.as_str().to_string()),
            disabled: Set(false),
            last_polled: Set(None),
            last_discovered: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = active.insert(db).await?;
        Device::try_from(inserted)
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Device>> {
        match Devices::find_by_id(id).one(db).await? {
            Some(m) => Ok(Some(Device::try_from(m)?)),
            None => Ok(None),
        }
    }

    pub async fn list_enabled(db: &DatabaseConnection) -> Result<Vec<Device>> {
        let models = Devices::find()
            .filter(devices::Column::Disabled.eq(false))
            .all(db)
            .await?;
        models.into_iter().map(Device::try_from).collect()
    }

    pub async fn set_status(db: &DatabaseConnection, id: Uuid, status: DeviceStatus) -> Result<()> {
        if let Some(model) = Devices::find_by_id(id).one(db).await? {
            let mut active: devices::ActiveModel = model.into();
            active.status = Set(status.as_str().to_string());
            active.updated_at = Set(chrono::Utc::now().naive_utc());
            active.update(db).await?;
            Ok(())
        } else {
            Err(YmError::NotFound {
                kind: "device",
                id: id.to_string(),
            })
        }
    }

    pub async fn touch_polled(db: &DatabaseConnection, id: Uuid) -> Result<()> {
        if let Some(model) = Devices::find_by_id(id).one(db).await? {
            let mut active: devices::ActiveModel = model.into();
            active.last_polled = Set(Some(chrono::Utc::now().naive_utc()));
            active.update(db).await?;
        }
        Ok(())
    }
}
