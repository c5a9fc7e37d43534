use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::entities::{prelude::*, sensors};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub id: Uuid,
    pub device_id: Uuid,
    pub index: i32,
    pub sensor_type: String,
    pub descr: String,
    pub class: String,
    pub oid: String,
    pub value: Option<f64>,
    pub prev_value: Option<f64>,
    pub limit_high: Option<f64>,
    pub limit_low: Option<f64>,
    pub warn_high: Option<f64>,
    pub warn_low: Option<f64>,
    pub divisor: f64,
    pub multiplier: f64,
    pub disabled: bool,
}

impl From<sensors::Model> for Sensor {
    fn from(m: sensors::Model) -> Self {
        Self {
            id: m.id,
            device_id: m.device_id,
            index: m.index,
            sensor_type: m.r#type,
            descr: m.descr,
            class: m.class,
            oid: m.oid,
            value: m.value,
            prev_value: m.prev_value,
            limit_high: m.limit_high,
            limit_low: m.limit_low,
            warn_high: m.warn_high,
            warn_low: m.warn_low,
            divisor: m.divisor,
            multiplier: m.multiplier,
            disabled: m.disabled,
        }
    }
}

impl Sensor {
    /// Applies the raw SNMP reading through the sensor's divisor/multiplier,
    /// per spec.md §4.4's sensor value normalization.
    pub fn normalize(&self, raw: f64) -> f64 {
        (raw / self.divisor) * self.multiplier
    }

    pub async fn list_for_device(db: &DatabaseConnection, device_id: Uuid) -> Result<Vec<Sensor>> {
        let models = Sensors::find()
            .filter(sensors::Column::DeviceId.eq(device_id))
            .filter(sensors::Column::Disabled.eq(false))
            .all(db)
            .await?;
        Ok(models.into_iter().map(Sensor::from).collect())
    }

    pub async fn update_value(db: &DatabaseConnection, id: Uuid, new_value: f64) -> Result<()> {
        if let Some(model) = Sensors::find_by_id(id).one(db).await? {
            let prev = model.value;
            let mut active: sensors::ActiveModel = model.into();
            active.prev_value = Set(prev);
            active.value = Set(Some(new_value));
            active.updated_at = Set(chrono::Utc::now().naive_utc());
            active.update(db).await?;
        }
        Ok(())
    }
}
