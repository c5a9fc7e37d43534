use chrono::NaiveDateTime;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::entities::{prelude::*, topology};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyLink {
    pub id: Uuid,
    pub device_id: Uuid,
    pub local_port: String,
    pub protocol: String,
    pub remote_chassis_id: Option<String>,
    pub remote_port_id: String,
    pub remote_hostname: String,
    pub remote_platform: Option<String>,
    pub last_updated: NaiveDateTime,
    pub active: bool,
}

impl From<topology::Model> for TopologyLink {
    fn from(m: topology::Model) -> Self {
        Self {
            id: m.id,
            device_id: m.device_id,
            local_port: m.local_port,
            protocol: m.protocol,
            remote_chassis_id: m.remote_chassis_id,
            remote_port_id: m.remote_port_id,
            remote_hostname: m.remote_hostname,
            remote_platform: m.remote_platform,
            last_updated: m.last_updated,
            active: m.active,
        }
    }
}

impl TopologyLink {
    /// Deduplicates on (device_id, protocol, local_port, remote_hostname) —
    /// insert if new, refresh `last_updated`/`active` if seen before.
    pub async fn upsert(
        db: &DatabaseConnection,
        device_id: Uuid,
        local_port: &str,
        protocol: &str,
        remote_chassis_id: Option<String>,
        remote_port_id: &str,
        remote_hostname: &str,
        remote_platform: Option<String>,
    ) -> Result<TopologyLink> {
        let existing = Topology::find()
            .filter(topology::Column::DeviceId.eq(device_id))
            .filter(topology::Column::Protocol.eq(protocol))
            .filter(topology::Column::LocalPort.eq(local_port))
            .filter(topology::Column::RemoteHostname.eq(remote_hostname))
            .one(db)
            .await?;

        let now = chrono::Utc::now().naive_utc();
        let saved = if let Some(model) = existing {
            let mut active: topology::ActiveModel = model.into();
            active.remote_chassis_id = Set(remote_chassis_id);
            active.remote_port_id = Set(remote_port_id.to_string());
            active.remote_platform = Set(remote_platform);
            active.last_updated = Set(now);
            active.active = Set(true);
            active.update(db).await?
        } else {
            let active = topology::ActiveModel {
                id: Set(Uuid::new_v4()),
                device_id: Set(device_id),
                local_port: Set(local_port.to_string()),
                protocol: Set(protocol.to_string()),
                remote_chassis_id: Set(remote_chassis_id),
                remote_port_id: Set(remote_port_id.to_string()),
                remote_hostname: Set(remote_hostname.to_string()),
                remote_platform: Set(remote_platform),
                last_updated: Set(now),
                active: Set(true),
            };
            active.insert(db).await?
        };
        Ok(TopologyLink::from(saved))
    }

    pub async fn list_for_device(db: &DatabaseConnection, device_id: Uuid) -> Result<Vec<TopologyLink>> {
        let models = Topology::find()
            .filter(topology::Column::DeviceId.eq(device_id))
            .filter(topology::Column::Active.eq(true))
            .all(db)
            .await?;
        Ok(models.into_iter().map(TopologyLink::from).collect())
    }
}
