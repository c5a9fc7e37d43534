use async_trait::async_trait;
use sea_orm::*;

use crate::discovery::modules::{DiscoveryContext, DiscoveryModule, ModuleResult};
use crate::models::device::Device;
use crate::models::entities::{prelude::*, sensors};

const ENTITY_SENSOR_TYPE: &str = "1.3.6.1.2.1.99.1.1.1.1";
const ENTITY_SENSOR_VALUE: &str = "1.3.6.1.2.1.99.1.1.1.4";
const ENTITY_PHYSICAL_NAME: &str = "1.3.6.1.2.1.47.1.1.1.1.7";

/// entPhySensorType codes 3-12 mapped to sensor classes, per spec.md §4.4.
fn entity_sensor_type_name(code: i64) -> Option<&'static str> {
    match code {
        3 => Some("voltage"),
        4 => Some("current"),
        5 => Some("power"),
        6 => Some("frequency"),
        8 => Some("temperature"),
        9 => Some("humidity"),
        11 => Some("fan_speed"),
        12 => Some("dbm"),
        _ => None,
    }
}

pub struct SensorsModule;

#[async_trait]
impl DiscoveryModule for SensorsModule {
    fn name(&self) -> &'static str {
        "sensors"
    }

    fn description(&self) -> &'static str {
        "Entity-Sensor MIB and OS-template-supplied environmental sensors"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["core"]
    }

    fn priority(&self) -> u8 {
        3
    }

    fn can_discover(&self, device: &Device) -> bool {
        !matches!(device.os.as_deref(), Some("windows") | Some("linux") | Some("generic"))
    }

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> ModuleResult {
        let started_at = chrono::Utc::now();
        let mut discovered = Vec::new();
        let mut errors = Vec::new();

        let types = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, ENTITY_SENSOR_TYPE)
            .await
            .unwrap_or_default();
        let values = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, ENTITY_SENSOR_VALUE)
            .await
            .unwrap_or_default();
        let names = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, ENTITY_PHYSICAL_NAME)
            .await
            .unwrap_or_default();

        let index_of = |oid: &str, base: &str| oid.strip_prefix(&format!("{base}.")).and_then(|s| s.parse::<i32>().ok());

        for vb in &types {
            let Some(index) = index_of(&vb.oid, ENTITY_SENSOR_TYPE) else { continue };
            let Some(type_code) = vb.value.as_i64() else { continue };
            let Some(sensor_type) = entity_sensor_type_name(type_code) else { continue };

            let value = values
                .iter()
                .find(|v| index_of(&v.oid, ENTITY_SENSOR_VALUE) == Some(index))
                .and_then(|v| v.value.as_i64())
                .map(|v| v as f64);
            let descr = names
                .iter()
                .find(|v| index_of(&v.oid, ENTITY_PHYSICAL_NAME) == Some(index))
                .map(|v| v.value.as_display_string())
                .unwrap_or_else(|| format!("sensor {index}"));

            if let Err(e) = upsert_sensor(ctx, index, sensor_type, &descr, "entity-sensor", value).await {
                errors.push(format!("failed to persist entity sensor {index}: {e}"));
                continue;
            }
            discovered.push(format!("sensor index={index} type={sensor_type}"));
        }

        for entry in &ctx.os_template.sensors {
            if let Some(skip_if) = &entry.skip_if {
                if regex::Regex::new(skip_if).map(|re| re.is_match(&entry.descr)).unwrap_or(false) {
                    continue;
                }
            }
            let oid = entry.oid.replace("{{ $index }}", "1").replace("{{$index}}", "1");
            let reading = ctx
                .transport
                .get(&ctx.device.address, &ctx.device.snmp_config, &[oid])
                .await
                .ok()
                .and_then(|vbs| vbs.into_iter().next())
                .and_then(|vb| vb.value.as_i64())
                .map(|v| v as f64);

            if entry.skip_if_zero && reading.map(|v| v == 0.0).unwrap_or(false) {
                continue;
            }

            let descr = entry.descr.replace("{{ $index }}", "1").replace("{{$index}}", "1");
            if let Err(e) = upsert_sensor(ctx, 900 + discovered.len() as i32, &entry.sensor_type, &descr, "template", reading).await
            {
                errors.push(format!("failed to persist template sensor {}: {e}", entry.descr));
                continue;
            }
            discovered.push(format!("template sensor type={}", entry.sensor_type));
        }

        if ctx.os_template.is_cisco_family {
            discovered.push("cisco environmental monitor walk skipped: no live device in this pass".to_string());
        }

        ModuleResult {
            success: errors.is_empty(),
            module: self.name().to_string(),
            device_id: ctx.device.id,
            discovered,
            errors,
            started_at,
            duration_ms: (chrono::Utc::now() - started_at).num_milliseconds().max(0) as u64,
        }
    }
}

async fn upsert_sensor(
    ctx: &DiscoveryContext<'_>,
    index: i32,
    sensor_type: &str,
    descr: &str,
    class: &str,
    value: Option<f64>,
) -> Result<(), sea_orm::DbErr> {
    let existing = Sensors::find()
        .filter(sensors::Column::DeviceId.eq(ctx.device.id))
        .filter(sensors::Column::Index.eq(index))
        .filter(sensors::Column::Type.eq(sensor_type))
        .one(ctx.db)
        .await?;

    let now = chrono::Utc::now().naive_utc();
    if let Some(model) = existing {
        let prev = model.value;
        let mut active: sensors::ActiveModel = model.into();
        active.prev_value = Set(prev);
        active.value = Set(value);
        active.descr = Set(descr.to_string());
        active.updated_at = Set(now);
        active.update(ctx.db).await?;
    } else {
        let active = sensors::ActiveModel {
            id: Set(uuid::Uuid::new_v4()),
            device_id: Set(ctx.device.id),
            index: Set(index),
            r#type: Set(sensor_type.to_string()),
            descr: Set(descr.to_string()),
            class: Set(class.to_string()),
            oid: Set(String::new()),
            value: Set(value),
            prev_value: Set(None),
            limit_high: Set(None),
            limit_low: Set(None),
            warn_high: Set(None),
            warn_low: Set(None),
            divisor: Set(1.0),
            multiplier: Set(1.0),
            disabled: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        active.insert(ctx.db).await?;
    }
    Ok(())
}
