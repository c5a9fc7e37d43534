use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::alerts::synthetic::INTERFACE_MONITORING_RULE_ID;
use crate::alerts::AlertEvaluator;
use crate::models::alert_rule::Severity;
use crate::models::device::{Device, DeviceStatus};
use crate::models::port::{Port, PortCounters};
use crate::polling::counters::{compute_rates, delta, InterfaceDeltas};
use crate::polling::history_ring::HistoryRing;
use crate::snmp::transport::SnmpTransport;
use crate::timeseries::{interface_point, TimeseriesClient};

const IF_ADMIN_STATUS: &str = "1.3.6.1.2.1.2.2.1.7";
const IF_OPER_STATUS: &str = "1.3.6.1.2.1.2.2.1.8";
const IF_IN_OCTETS: &str = "1.3.6.1.2.1.2.2.1.10";
const IF_IN_UCAST: &str = "1.3.6.1.2.1.2.2.1.11";
const IF_IN_DISCARDS: &str = "1.3.6.1.2.1.2.2.1.13";
const IF_IN_ERRORS: &str = "1.3.6.1.2.1.2.2.1.14";
const IF_OUT_OCTETS: &str = "1.3.6.1.2.1.2.2.1.16";
const IF_OUT_UCAST: &str = "1.3.6.1.2.1.2.2.1.17";
const IF_OUT_DISCARDS: &str = "1.3.6.1.2.1.2.2.1.19";
const IF_OUT_ERRORS: &str = "1.3.6.1.2.1.2.2.1.20";
const IF_HC_IN_OCTETS: &str = "1.3.6.1.2.1.31.1.1.1.6";
const IF_HC_OUT_OCTETS: &str = "1.3.6.1.2.1.31.1.1.1.10";

const DEFAULT_BATCH_SIZE: usize = 10;
const HISTORY_CAPACITY: usize = 100;
const ERROR_RATE_THRESHOLD: f64 = 1.0;

fn admin_status_name(code: i64) -> &'static str {
    match code {
        1 => "up",
        2 => "down",
        _ => "testing",
    }
}

fn oper_status_name(code: i64) -> &'static str {
    match code {
        1 => "up",
        2 => "down",
        3 => "testing",
        _ => "unknown",
    }
}

#[derive(Clone)]
struct CounterSnapshot {
    at: DateTime<Utc>,
    counters: PortCounters,
}

/// Interface poller (component F): per-device GET of the required
/// ifTable/ifXTable OIDs for each known port, counter-delta/rate
/// computation against the previous sample, time-series write, and
/// threshold-driven synthetic alert forwarding, per spec.md §4.6.
#[derive(Clone)]
pub struct InterfacePoller {
    db: DatabaseConnection,
    transport: SnmpTransport,
    timeseries: TimeseriesClient,
    evaluator: AlertEvaluator,
    history: HistoryRing<CounterSnapshot>,
    batch_size: usize,
    error_rate_threshold: f64,
}

impl InterfacePoller {
    pub fn new(db: DatabaseConnection, transport: SnmpTransport, timeseries: TimeseriesClient, evaluator: AlertEvaluator) -> Self {
        Self {
            db,
            transport,
            timeseries,
            evaluator,
            history: HistoryRing::new(HISTORY_CAPACITY),
            batch_size: DEFAULT_BATCH_SIZE,
            error_rate_threshold: ERROR_RATE_THRESHOLD,
        }
    }

    /// Polls every enabled device with known ports, chunked into
    /// sequential batches of `batch_size` with concurrent devices
    /// inside each batch.
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
                    warn!(error = %e, "interface poll cycle failed for a device");
                }
            }
        }
        Ok(())
    }

    async fn poll_device(&self, device: &Device) -> crate::error::Result<()> {
        if self.transport.test_connection(&device.address, &device.snmp_config).await.is_err() {
            Device::set_status(&self.db, device.id, DeviceStatus::Down).await?;
            debug!(device = %device.hostname, "connectivity probe failed, skipping interface poll");
            return Ok(());
        }

        let ports = Port::list_for_device(&self.db, device.id).await?;
        for port in &ports {
            if let Err(e) = self.poll_port(device, port).await {
                warn!(device = %device.hostname, port = port.if_index, error = %e, "interface poll failed for port");
            }
        }
        Ok(())
    }

    async fn poll_port(&self, device: &Device, port: &Port) -> crate::error::Result<()> {
        let oids: Vec<String> = [
            IF_ADMIN_STATUS,
            IF_OPER_STATUS,
            IF_IN_OCTETS,
            IF_IN_UCAST,
            IF_IN_DISCARDS,
            IF_IN_ERRORS,
            IF_OUT_OCTETS,
            IF_OUT_UCAST,
            IF_OUT_DISCARDS,
            IF_OUT_ERRORS,
            IF_HC_IN_OCTETS,
            IF_HC_OUT_OCTETS,
        ]
        .iter()
        .map(|base| format!("{base}.{}", port.if_index))
        .collect();

        let varbinds = self.transport.get(&device.address, &device.snmp_config, &oids).await?;
        let at = |base: &str| -> Option<&crate::snmp::pdu::RawValue> {
            let target = format!("{base}.{}", port.if_index);
            varbinds.iter().find(|v| v.oid == target).map(|v| &v.value)
        };

        let admin_status = at(IF_ADMIN_STATUS).and_then(|v| v.as_i64()).map(admin_status_name).unwrap_or("down");
        let oper_status = at(IF_OPER_STATUS).and_then(|v| v.as_i64()).map(oper_status_name).unwrap_or("unknown");
        let counters = PortCounters {
            in_octets: at(IF_IN_OCTETS).and_then(|v| v.as_u64()).unwrap_or(0),
            out_octets: at(IF_OUT_OCTETS).and_then(|v| v.as_u64()).unwrap_or(0),
            in_ucast: at(IF_IN_UCAST).and_then(|v| v.as_u64()).unwrap_or(0),
            out_ucast: at(IF_OUT_UCAST).and_then(|v| v.as_u64()).unwrap_or(0),
            in_discards: at(IF_IN_DISCARDS).and_then(|v| v.as_u64()).unwrap_or(0),
            out_discards: at(IF_OUT_DISCARDS).and_then(|v| v.as_u64()).unwrap_or(0),
            in_errors: at(IF_IN_ERRORS).and_then(|v| v.as_u64()).unwrap_or(0),
            out_errors: at(IF_OUT_ERRORS).and_then(|v| v.as_u64()).unwrap_or(0),
            hc_in_octets: at(IF_HC_IN_OCTETS).and_then(|v| v.as_u64()),
            hc_out_octets: at(IF_HC_OUT_OCTETS).and_then(|v| v.as_u64()),
        };

        let now = Utc::now();
        let history_key = port.id.to_string();
        let previous = self.history.latest(&history_key);
        self.history.push(
            &history_key,
            CounterSnapshot {
                at: now,
                counters: counters.clone(),
            },
        );

        let (deltas, dt_s) = match previous {
            Some(prev) => {
                let dt_s = (now - prev.at).num_milliseconds() as f64 / 1000.0;
                (
                    InterfaceDeltas {
                        in_octets: delta(prev.counters.in_octets, counters.in_octets),
                        out_octets: delta(prev.counters.out_octets, counters.out_octets),
                        in_errors: delta(prev.counters.in_errors, counters.in_errors),
                        out_errors: delta(prev.counters.out_errors, counters.out_errors),
                        in_discards: delta(prev.counters.in_discards, counters.in_discards),
                        out_discards: delta(prev.counters.out_discards, counters.out_discards),
                        in_ucast: delta(prev.counters.in_ucast, counters.in_ucast),
                        out_ucast: delta(prev.counters.out_ucast, counters.out_ucast),
                    },
                    dt_s,
                )
            }
            None => (InterfaceDeltas::default(), 0.0),
        };
        let rates = compute_rates(&deltas, dt_s, port.speed_bps);

        let point = interface_point(
            device,
            port.id,
            port.if_index,
            admin_status,
            oper_status,
            &deltas,
            &rates,
            counters.hc_in_octets,
            counters.hc_out_octets,
            now,
        );
        if let Err(e) = self.timeseries.write_one(point).await {
            warn!(device = %device.hostname, port = port.if_index, error = %e, "failed to write interface time-series point");
        }

        Port::upsert_counters(&self.db, port.id, &counters, oper_status).await?;

        self.check_thresholds(device, port, admin_status, oper_status, &rates).await?;
        Ok(())
    }

    async fn check_thresholds(
        &self,
        device: &Device,
        port: &Port,
        admin_status: &str,
        oper_status: &str,
        rates: &crate::polling::counters::InterfaceRates,
    ) -> crate::error::Result<()> {
        let details = json!({
            "port_id": port.id,
            "if_index": port.if_index,
            "name": port.name,
            "utilization": rates.utilization,
            "error_rate": rates.error_rate,
            "admin_status": admin_status,
            "oper_status": oper_status,
        });

        self.forward_breach(
            device,
            port.id,
            "utilization",
            rates.utilization >= 95.0,
            Severity::Critical,
            format!("{} utilization critical on {}", port.name, device.hostname),
            format!("Interface {} utilization is {:.1}%", port.name, rates.utilization),
            details.clone(),
        )
        .await?;
        self.forward_breach(
            device,
            port.id,
            "utilization-warning",
            (90.0..95.0).contains(&rates.utilization),
            Severity::Warning,
            format!("{} utilization high on {}", port.name, device.hostname),
            format!("Interface {} utilization is {:.1}%", port.name, rates.utilization),
            details.clone(),
        )
        .await?;
        self.forward_breach(
            device,
            port.id,
            "error-rate",
            rates.error_rate > self.error_rate_threshold,
            Severity::Warning,
            format!("{} error rate high on {}", port.name, device.hostname),
            format!("Interface {} error rate is {:.2}%", port.name, rates.error_rate),
            details.clone(),
        )
        .await?;
        self.forward_breach(
            device,
            port.id,
            "admin-oper-mismatch",
            admin_status == "up" && oper_status == "down",
            Severity::Warning,
            format!("{} is down on {}", port.name, device.hostname),
            format!("Interface {} is administratively up but operationally down", port.name),
            details,
        )
        .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn forward_breach(
        &self,
        device: &Device,
        port_id: Uuid,
        kind: &str,
        is_breached: bool,
        severity: Severity,
        title: String,
        message: String,
        details: serde_json::Value,
    ) -> crate::error::Result<()> {
        let suffix = format!("port:{port_id}:{kind}");
        self.evaluator
            .evaluate_breach(
                &self.db,
                INTERFACE_MONITORING_RULE_ID,
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
    fn admin_and_oper_status_codes_map() {
        assert_eq!(admin_status_name(1), "up");
        assert_eq!(admin_status_name(2), "down");
        assert_eq!(oper_status_name(2), "down");
        assert_eq!(oper_status_name(99), "unknown");
    }
}
