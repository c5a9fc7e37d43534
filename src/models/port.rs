use chrono::NaiveDateTime;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::entities::{ports, prelude::*};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortCounters {
    pub in_octets: u64,
    pub out_octets: u64,
    pub in_ucast: u64,
    pub out_ucast: u64,
    pub in_discards: u64,
    pub out_discards: u64,
    pub in_errors: u64,
    pub out_errors: u64,
    pub hc_in_octets: Option<u64>,
    pub hc_out_octets: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub id: Uuid,
    pub device_id: Uuid,
    pub if_index: i32,
    pub name: String,
    pub alias: Option<String>,
    pub if_type: String,
    pub mtu: Option<i32>,
    pub speed_bps: Option<u64>,
    pub admin_status: String,
    pub oper_status: String,
    pub counters: PortCounters,
    pub disabled: bool,
    pub last_polled: Option<NaiveDateTime>,
}

impl From<ports::Model> for Port {
    fn from(m: ports::Model) -> Self {
        Self {
            id: m.id,
            device_id: m.device_id,
            if_index: m.if_index,
            name: m.name,
            alias: m.alias,
            if_type: m.r#type,
            mtu: m.mtu,
            speed_bps: m.speed_bps.map(|v| v as u64),
            admin_status: m.admin_status,
            oper_status: m.oper_status,
            counters: PortCounters {
                in_octets: m.in_octets as u64,
                out_octets: m.out_octets as u64,
                in_ucast: m.in_ucast as u64,
                out_ucast: m.out_ucast as u64,
                in_discards: m.in_discards as u64,
                out_discards: m.out_discards as u64,
                in_errors: m.in_errors as u64,
                out_errors: m.out_errors as u64,
                hc_in_octets: m.hc_in_octets.map(|v| v as u64),
                hc_out_octets: m.hc_out_octets.map(|v| v as u64),
            },
            disabled: m.disabled,
            last_polled: m.last_polled,
        }
    }
}

impl Port {
    pub async fn list_for_device(db: &DatabaseConnection, device_id: Uuid) -> Result<Vec<Port>> {
        let models = Ports::find()
            .filter(ports::Column::DeviceId.eq(device_id))
            .filter(ports::Column::Disabled.eq(false))
            .all(db)
            .await?;
        Ok(models.into_iter().map(Port::from).collect())
    }

    pub async fn find_by_device_and_index(
        db: &DatabaseConnection,
        device_id: Uuid,
        if_index: i32,
    ) -> Result<Option<Port>> {
        let model = Ports::find()
            .filter(ports::Column::DeviceId.eq(device_id))
            .filter(ports::Column::IfIndex.eq(if_index))
            .one(db)
            .await?;
        Ok(model.map(Port::from))
    }

    pub async fn upsert_counters(
        db: &DatabaseConnection,
        id: Uuid,
        counters: &PortCounters,
        oper_status: &str,
    ) -> Result<()> {
        if let Some(model) = Ports::find_by_id(id).one(db).await? {
            let mut active: ports::ActiveModel = model.into();
            active.in_octets = Set(counters.in_octets as i64);
            active.out_octets = Set(counters.out_octets as i64);
            active.in_ucast = Set(counters.in_ucast as i64);
            active.out_ucast = Set(counters.out_ucast as i64);
            active.in_discards = Set(counters.in_discards as i64);
            active.out_discards = Set(counters.out_discards as i64);
            active.in_errors = Set(counters.in_errors as i64);
            active.out_errors = Set(counters.out_errors as i64);
            active.hc_in_octets = Set(counters.hc_in_octets.map(|v| v as i64));
            active.hc_out_octets = Set(counters.hc_out_octets.map(|v| v as i64));
            active.oper_status = Set(oper_status.to_string());
            active.last_polled = Set(Some(chrono::Utc::now().naive_utc()));
            active.updated_at = Set(chrono::Utc::now().naive_utc());
            active.update(db).await?;
        }
        Ok(())
    }
}
