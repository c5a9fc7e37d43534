use sea_orm::DatabaseConnection;
use serde_json::{json, Map, Value as Json};

use crate::error::Result;
use crate::models::device::Device;
use crate::models::port::Port;
use crate::models::sensor::Sensor;
use crate::polling::counters::InterfaceRates;

/// Builds the per-tick metric dictionary the evaluator resolves
/// dotted field paths against (`device.cpu`, `device.status`, ...),
/// per the GLOSSARY's "Metric context" definition. Device-scalar
/// metrics collected by pollers but not modeled as Device columns
/// (e.g. `cpu_usage`) are merged in via `with_metric`.
pub struct MetricContextBuilder {
    device: Map<String, Json>,
    interfaces: Map<String, Json>,
    sensors: Map<String, Json>,
}

impl MetricContextBuilder {
    pub fn new(device: &Device) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), json!(device.id.to_string()));
        map.insert("hostname".to_string(), json!(device.hostname));
        map.insert("address".to_string(), json!(device.address));
        map.insert("os".to_string(), json!(device.os));
        map.insert("vendor".to_string(), json!(device.vendor));
        map.insert("status".to_string(), json!(device.status.as_str()));
        map.insert("uptime".to_string(), json!(device.uptime));
        Self {
            device: map,
            interfaces: Map::new(),
            sensors: Map::new(),
        }
    }

    pub fn with_metric(mut self, key: &str, value: f64) -> Self {
        self.device.insert(key.to_string(), json!(value));
        self
    }

    pub fn with_interface(mut self, if_index: i32, rates: &InterfaceRates, oper_status: &str, admin_status: &str) -> Self {
        self.interfaces.insert(
            if_index.to_string(),
            json!({
                "utilization": rates.utilization,
                "in_utilization": rates.in_utilization,
                "out_utilization": rates.out_utilization,
                "error_rate": rates.error_rate,
                "discard_rate": rates.discard_rate,
                "oper_status": oper_status,
                "admin_status": admin_status,
            }),
        );
        self
    }

    pub fn with_sensor(mut self, index: i32, sensor_type: &str, value: f64) -> Self {
        self.sensors.insert(
            index.to_string(),
            json!({
                "type": sensor_type,
                "value": value,
            }),
        );
        self
    }

    pub fn build(self) -> Json {
        json!({
            "device": self.device,
            "interfaces": self.interfaces,
            "sensors": self.sensors,
        })
    }
}

/// Assembles the metric context the rule evaluator's periodic tick
/// (§4.7) uses from persisted current-state columns. Utilization and
/// error-rate live only in the poller's in-memory history ring, not in
/// the relational store, so interface entries here carry oper/admin
/// status only; per-sample threshold breaches are forwarded directly
/// by the pollers via `AlertEvaluator::evaluate_breach` instead.
pub async fn build_for_device(db: &DatabaseConnection, device: &Device) -> Result<Json> {
    let mut builder = MetricContextBuilder::new(device);
    let zero_rates = InterfaceRates {
        in_utilization: 0.0,
        out_utilization: 0.0,
        utilization: 0.0,
        error_rate: 0.0,
        discard_rate: 0.0,
    };
    for port in Port::list_for_device(db, device.id).await? {
        builder = builder.with_interface(port.if_index, &zero_rates, &port.oper_status, &port.admin_status);
    }
    for sensor in Sensor::list_for_device(db, device.id).await? {
        if let Some(value) = sensor.value {
            builder = builder.with_sensor(sensor.index, &sensor.sensor_type, value);
        }
    }
    Ok(builder.build())
}
