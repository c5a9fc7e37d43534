use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::{debug, warn};

use crate::alerts::synthetic::SENSOR_MONITORING_RULE_ID;
use crate::alerts::AlertEvaluator;
use crate::models::alert_rule::Severity;
use crate::models::device::{Device, DeviceStatus};
use crate::models::sensor::Sensor;
use crate::polling::history_ring::HistoryRing;
use crate::snmp::transport::SnmpTransport;
use crate::timeseries::{sensor_point, TimeseriesClient};

const ENTITY_SENSOR_VALUE: &str = "1.3.6.1.2.1.99.1.1.1.4";

const DEFAULT_BATCH_SIZE: usize = 5;
const HISTORY_CAPACITY: usize = 200;

/// Applies the type-specific scale correction before the
/// divisor/multiplier normalization, per spec.md §4.6's sensor
/// scaling rules.
fn transform(value: f64, sensor_type: &str) -> f64 {
    match sensor_type {
        "temperature" if value.abs() > 100.0 => value / 10.0,
        "voltage" if value.abs() > 1000.0 => value / 1000.0,
        "power" if value.abs() > 100_000.0 => value / 1000.0,
        _ => value,
    }
}

fn unit_for(sensor_type: &str) -> Option<&'static str> {
    match sensor_type {
        "temperature" => Some("\u{b0}C"),
        "humidity" => Some("%"),
        "voltage" => Some("V"),
        "current" => Some("A"),
        "power" => Some("W"),
        "frequency" => Some("Hz"),
        "fan_speed" => Some("RPM"),
        "signal" | "dbm" => Some("dBm"),
        _ => None,
    }
}

/// Sensor poller (component G): per-sensor GET, scale/normalize,
/// time-series write, and threshold-driven synthetic alert
/// forwarding, per spec.md §4.6.
#[derive(Clone)]
pub struct SensorPoller {
    db: DatabaseConnection,
    transport: SnmpTransport,
    timeseries: TimeseriesClient,
    evaluator: AlertEvaluator,
    history: HistoryRing<f64>,
    batch_size: usize,
}

impl SensorPoller {
    pub fn new(db: DatabaseConnection, transport: SnmpTransport, timeseries: TimeseriesClient, evaluator: AlertEvaluator) -> Self {
        Self {
            db,
            transport,
            timeseries,
            evaluator,
            history: HistoryRing::new(HISTORY_CAPACITY),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub async fn tick(&self) -> crate::error::Result<()> {
        let devices = Device::list_enabled(&self.db).await?;
        for batch in devices.chunks(self.batch_size) {
            let mut set = tokio::task::JoinSet::new();
            for device in batch.iter().cloned() {
                let poller = self.clone();
                set.spawn(async move { poller.poll_device(&device).await });
            }
            while let Some(res) = set.join_next().await {
                if let Ok(Err(e)) = res {
                    warn!(error = %e, "sensor poll cycle failed for a device");
                }
            }
        }
        Ok(())
    }

    async fn poll_device(&self, device: &Device) -> crate::error::Result<()> {
        if self.transport.test_connection(&device.address, &device.snmp_config).await.is_err() {
            Device::set_status(&self.db, device.id, DeviceStatus::Down).await?;
            debug!(device = %device.hostname, "connectivity probe failed, skipping sensor poll");
            return Ok(());
        }

        let sensors = Sensor::list_for_device(&self.db, device.id).await?;
        for sensor in &sensors {
            if let Err(e) = self.poll_sensor(device, sensor).await {
                warn!(device = %device.hostname, sensor = sensor.index, error = %e, "sensor poll failed");
            }
        }
        Ok(())
    }

    async fn poll_sensor(&self, device: &Device, sensor: &Sensor) -> crate::error::Result<()> {
        let oid = if sensor.oid.is_empty() {
            format!("{ENTITY_SENSOR_VALUE}.{}", sensor.index)
        } else {
            sensor.oid.clone()
        };
        let varbinds = self.transport.get(&device.address, &device.snmp_config, &[oid]).await?;
        let Some(raw) = varbinds.first().and_then(|v| v.value.as_i64()).map(|v| v as f64) else {
            return Ok(());
        };

        let scaled = transform(raw, &sensor.sensor_type);
        let value = sensor.normalize(scaled);
        self.history.push(&sensor.id.to_string(), value);

        Sensor::update_value(&self.db, sensor.id, value).await?;

        let unit = unit_for(&sensor.sensor_type);
        let point = sensor_point(device, sensor.id, &sensor.sensor_type, unit, value, Utc::now());
        if let Err(e) = self.timeseries.write_one(point).await {
            warn!(device = %device.hostname, sensor = sensor.index, error = %e, "failed to write sensor time-series point");
        }

        self.check_thresholds(device, sensor, value).await?;
        Ok(())
    }

    async fn check_thresholds(&self, device: &Device, sensor: &Sensor, value: f64) -> crate::error::Result<()> {
        let details = json!({
            "sensor_id": sensor.id,
            "sensor_type": sensor.sensor_type,
            "descr": sensor.descr,
            "value": value,
        });

        let (warn_breach, crit_breach) = self.thresholds_for(sensor, value);

        self.forward_breach(
            device,
            sensor,
            "critical",
            crit_breach,
            Severity::Critical,
            format!("{} critical on {}", sensor.descr, device.hostname),
            format!("Sensor {} reading {:.2} is critical", sensor.descr, value),
            details.clone(),
        )
        .await?;
        self.forward_breach(
            device,
            sensor,
            "warning",
            warn_breach && !crit_breach,
            Severity::Warning,
            format!("{} warning on {}", sensor.descr, device.hostname),
            format!("Sensor {} reading {:.2} is out of range", sensor.descr, value),
            details,
        )
        .await?;
        Ok(())
    }

    /// Returns `(warning, critical)` breach flags. Per-sensor
    /// `limit_high`/`limit_low` take priority; type-specific defaults
    /// apply only when no explicit limit is configured.
    fn thresholds_for(&self, sensor: &Sensor, value: f64) -> (bool, bool) {
        if sensor.limit_high.is_some() || sensor.limit_low.is_some() {
            let high = sensor.limit_high.map(|h| value > h).unwrap_or(false);
            let low = sensor.limit_low.map(|l| value < l).unwrap_or(false);
            return (high || low, false);
        }
        match sensor.sensor_type.as_str() {
            "temperature" => (value > 70.0, value > 80.0),
            "humidity" => (!(10.0..=80.0).contains(&value), false),
            "voltage" => (value < 10.0, value < 5.0),
            _ => (false, false),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn forward_breach(
        &self,
        device: &Device,
        sensor: &Sensor,
        kind: &str,
        is_breached: bool,
        severity: Severity,
        title: String,
        message: String,
        details: serde_json::Value,
    ) -> crate::error::Result<()> {
        let suffix = format!("sensor:{}:{kind}", sensor.id);
        self.evaluator
            .evaluate_breach(
                &self.db,
                SENSOR_MONITORING_RULE_ID,
                device,
                severity,
                is_breached,
                0,
                true,
                &suffix,
                title,
                message,
                details,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_transform_scales_tenths_of_degree() {
        assert_eq!(transform(235.0, "temperature"), 23.5);
        assert_eq!(transform(42.0, "temperature"), 42.0);
    }

    #[test]
    fn voltage_transform_scales_millivolts() {
        assert_eq!(transform(12_000.0, "voltage"), 12.0);
        assert_eq!(transform(12.0, "voltage"), 12.0);
    }

    #[test]
    fn units_match_sensor_type() {
        assert_eq!(unit_for("temperature"), Some("\u{b0}C"));
        assert_eq!(unit_for("dbm"), Some("dBm"));
        assert_eq!(unit_for("unknown"), None);
    }
}
