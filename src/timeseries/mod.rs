pub mod client;
pub mod point;

pub use client::{TimeseriesClient, TimeseriesError};
pub use point::Point;

use crate::models::device::Device;
use crate::polling::counters::InterfaceRates;
use uuid::Uuid;

/// Builds the `interface_metrics` point for one port sample, per
/// spec.md §6.
pub fn interface_point(
    device: &Device,
    port_id: Uuid,
    if_index: i32,
    admin_status: &str,
    oper_status: &str,
    deltas: &crate::polling::counters::InterfaceDeltas,
    rates: &InterfaceRates,
    hc_in: Option<u64>,
    hc_out: Option<u64>,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Point {
    Point::new("interface_metrics", timestamp)
        .tag("device_id", device.id.to_string())
        .tag("port_id", port_id.to_string())
        .tag("if_index", if_index.to_string())
        .tag("admin_status", admin_status)
        .tag("oper_status", oper_status)
        .field("if_in_octets", deltas.in_octets as i64)
        .field("if_out_octets", deltas.out_octets as i64)
        .field("if_in_ucast_pkts", deltas.in_ucast as i64)
        .field("if_out_ucast_pkts", deltas.out_ucast as i64)
        .field("if_in_discards", deltas.in_discards as i64)
        .field("if_out_discards", deltas.out_discards as i64)
        .field("if_in_errors", deltas.in_errors as i64)
        .field("if_out_errors", deltas.out_errors as i64)
        .field_opt("if_hc_in_octets", hc_in.map(|v| v as i64))
        .field_opt("if_hc_out_octets", hc_out.map(|v| v as i64))
        .field("utilization", rates.utilization)
        .field("in_utilization", rates.in_utilization)
        .field("out_utilization", rates.out_utilization)
        .field("error_rate", rates.error_rate)
}

/// Builds the `sensor_metrics` point, per spec.md §6.
pub fn sensor_point(
    device: &Device,
    sensor_id: Uuid,
    sensor_type: &str,
    unit: Option<&str>,
    value: f64,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Point {
    Point::new("sensor_metrics", timestamp)
        .tag("device_id", device.id.to_string())
        .tag("sensor_id", sensor_id.to_string())
        .tag("sensor_type", sensor_type)
        .tag_opt("unit", unit)
        .field("value", value)
}

/// Builds the `device_metrics` point, per spec.md §6.
pub fn device_point(
    device: &Device,
    response_time_ms: f64,
    availability: f64,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Point {
    Point::new("device_metrics", timestamp)
        .tag("device_id", device.id.to_string())
        .tag("hostname", device.hostname.clone())
        .tag("status", device.status.as_str())
        .field("response_time", response_time_ms)
        .field("availability", availability)
        .field_opt("uptime", device.uptime.map(|v| v as i64))
}

/// Builds the `alert_metrics` point, per spec.md §6.
pub fn alert_point(
    device_id: Uuid,
    alert_type: &str,
    severity: &str,
    count: i64,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Point {
    Point::new("alert_metrics", timestamp)
        .tag("device_id", device_id.to_string())
        .tag("alert_type", alert_type)
        .tag("severity", severity)
        .field("count", count)
}
