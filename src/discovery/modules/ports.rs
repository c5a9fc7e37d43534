use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use sea_orm::*;

use crate::discovery::modules::{DiscoveryContext, DiscoveryModule, ModuleResult};
use crate::discovery::os_template::{DEFAULT_IGNORE_IF, DEFAULT_IGNORE_TYPES};
use crate::models::device::Device;
use crate::models::entities::{ports, prelude::*};

const IF_DESCR: &str = "1.3.6.1.2.1.2.2.1.2";
const IF_TYPE: &str = "1.3.6.1.2.1.2.2.1.3";
const IF_MTU: &str = "1.3.6.1.2.1.2.2.1.4";
const IF_SPEED: &str = "1.3.6.1.2.1.2.2.1.5";
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
const IF_ALIAS: &str = "1.3.6.1.2.1.31.1.1.1.18";
const IF_HC_IN_OCTETS: &str = "1.3.6.1.2.1.31.1.1.1.6";
const IF_HC_OUT_OCTETS: &str = "1.3.6.1.2.1.31.1.1.1.10";

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

pub struct PortsModule;

fn should_ignore(if_index: i32, name: &str, if_type: i32, ignore_if: &[Regex], ignore_types: &HashSet<i32>) -> bool {
    if ignore_types.contains(&if_type) {
        return true;
    }
    ignore_if.iter().any(|re| re.is_match(name)) || if_index < 0
}

#[async_trait]
impl DiscoveryModule for PortsModule {
    fn name(&self) -> &'static str {
        "ports"
    }

    fn description(&self) -> &'static str {
        "Walks ifTable/ifXTable and maintains the port inventory"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["core"]
    }

    fn priority(&self) -> u8 {
        2
    }

    fn can_discover(&self, _device: &Device) -> bool {
        true
    }

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> ModuleResult {
        let started_at = chrono::Utc::now();
        let mut discovered = Vec::new();
        let mut errors = Vec::new();

        let walk_column = |oid: &str| {
            let ctx = ctx;
            let oid = oid.to_string();
            async move { ctx.transport.walk(&ctx.device.address, &ctx.device.snmp_config, &oid).await }
        };

        let descr = match walk_column(IF_DESCR).await {
            Ok(v) => v,
            Err(e) => {
                errors.push(format!("ifDescr walk failed: {e}"));
                Vec::new()
            }
        };
        let types = walk_column(IF_TYPE).await.unwrap_or_default();
        let mtus = walk_column(IF_MTU).await.unwrap_or_default();
        let speeds = walk_column(IF_SPEED).await.unwrap_or_default();
        let admin = walk_column(IF_ADMIN_STATUS).await.unwrap_or_default();
        let oper = walk_column(IF_OPER_STATUS).await.unwrap_or_default();
        let in_octets = walk_column(IF_IN_OCTETS).await.unwrap_or_default();
        let in_ucast = walk_column(IF_IN_UCAST).await.unwrap_or_default();
        let in_discards = walk_column(IF_IN_DISCARDS).await.unwrap_or_default();
        let in_errors = walk_column(IF_IN_ERRORS).await.unwrap_or_default();
        let out_octets = walk_column(IF_OUT_OCTETS).await.unwrap_or_default();
        let out_ucast = walk_column(IF_OUT_UCAST).await.unwrap_or_default();
        let out_discards = walk_column(IF_OUT_DISCARDS).await.unwrap_or_default();
        let out_errors = walk_column(IF_OUT_ERRORS).await.unwrap_or_default();
        let alias = walk_column(IF_ALIAS).await.unwrap_or_default();
        let hc_in = walk_column(IF_HC_IN_OCTETS).await.unwrap_or_default();
        let hc_out = walk_column(IF_HC_OUT_OCTETS).await.unwrap_or_default();

        let index_of = |oid: &str, base: &str| -> Option<i32> {
            oid.strip_prefix(&format!("{base}.")).and_then(|s| s.parse().ok())
        };
        let value_at = |list: &[crate::snmp::pdu::Varbind], base: &str, idx: i32| {
            list.iter()
                .find(|v| index_of(&v.oid, base) == Some(idx))
                .map(|v| v.value.clone())
        };

        let mut ignore_if: Vec<Regex> = DEFAULT_IGNORE_IF
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        ignore_if.extend(ctx.os_template.ignore_if.iter().filter_map(|p| Regex::new(p).ok()));
        let mut ignore_types: HashSet<i32> = DEFAULT_IGNORE_TYPES.iter().copied().collect();
        ignore_types.extend(ctx.os_template.ignore_type.iter().copied());

        let mut observed_indexes = HashSet::new();

        for vb in &descr {
            let Some(if_index) = index_of(&vb.oid, IF_DESCR) else { continue };
            let name = vb.value.as_display_string();
            let if_type = value_at(&types, IF_TYPE, if_index).and_then(|v| v.as_i64()).unwrap_or(0) as i32;

            if should_ignore(if_index, &name, if_type, &ignore_if, &ignore_types) {
                continue;
            }
            observed_indexes.insert(if_index);

            let mtu = value_at(&mtus, IF_MTU, if_index).and_then(|v| v.as_i64()).map(|v| v as i32);
            let speed = value_at(&speeds, IF_SPEED, if_index).and_then(|v| v.as_i64());
            let admin_status = value_at(&admin, IF_ADMIN_STATUS, if_index)
                .and_then(|v| v.as_i64())
                .map(admin_status_name)
                .unwrap_or("down");
            let oper_status = value_at(&oper, IF_OPER_STATUS, if_index)
                .and_then(|v| v.as_i64())
                .map(oper_status_name)
                .unwrap_or("unknown");
            let alias_value = value_at(&alias, IF_ALIAS, if_index).map(|v| v.as_display_string());

            let counters = crate::models::port::PortCounters {
                in_octets: value_at(&in_octets, IF_IN_OCTETS, if_index).and_then(|v| v.as_u64()).unwrap_or(0),
                out_octets: value_at(&out_octets, IF_OUT_OCTETS, if_index).and_then(|v| v.as_u64()).unwrap_or(0),
                in_ucast: value_at(&in_ucast, IF_IN_UCAST, if_index).and_then(|v| v.as_u64()).unwrap_or(0),
                out_ucast: value_at(&out_ucast, IF_OUT_UCAST, if_index).and_then(|v| v.as_u64()).unwrap_or(0),
                in_discards: value_at(&in_discards, IF_IN_DISCARDS, if_index).and_then(|v| v.as_u64()).unwrap_or(0),
                out_discards: value_at(&out_discards, IF_OUT_DISCARDS, if_index).and_then(|v| v.as_u64()).unwrap_or(0),
                in_errors: value_at(&in_errors, IF_IN_ERRORS, if_index).and_then(|v| v.as_u64()).unwrap_or(0),
                out_errors: value_at(&out_errors, IF_OUT_ERRORS, if_index).and_then(|v| v.as_u64()).unwrap_or(0),
                hc_in_octets: value_at(&hc_in, IF_HC_IN_OCTETS, if_index).and_then(|v| v.as_u64()),
                hc_out_octets: value_at(&hc_out, IF_HC_OUT_OCTETS, if_index).and_then(|v| v.as_u64()),
            };

            let existing = Ports::find()
                .filter(ports::Column::DeviceId.eq(ctx.device.id))
                .filter(ports::Column::IfIndex.eq(if_index))
                .one(ctx.db)
                .await
                .ok()
                .flatten();

            let now = chrono::Utc::now().naive_utc();
            let result = if let Some(model) = existing {
                let mut active: ports::ActiveModel = model.into();
                active.name = Set(name.clone());
                active.alias = Set(alias_value);
                active.mtu = Set(mtu);
                active.speed_bps = Set(speed);
                active.admin_status = Set(admin_status.to_string());
                active.oper_status = Set(oper_status.to_string());
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
                active.disabled = Set(false);
                active.updated_at = Set(now);
                active.update(ctx.db).await.map(|_| ())
            } else {
                let active = ports::ActiveModel {
                    id: Set(uuid::Uuid::new_v4()),
                    device_id: Set(ctx.device.id),
                    if_index: Set(if_index),
                    name: Set(name.clone()),
                    alias: Set(alias_value),
                    r#type: Set(if_type.to_string()),
                    mtu: Set(mtu),
                    speed_bps: Set(speed),
                    admin_status: Set(admin_status.to_string()),
                    oper_status: Set(oper_status.to_string()),
                    in_octets: Set(counters.in_octets as i64),
                    out_octets: Set(counters.out_octets as i64),
                    in_ucast: Set(counters.in_ucast as i64),
                    out_ucast: Set(counters.out_ucast as i64),
                    in_discards: Set(counters.in_discards as i64),
                    out_discards: Set(counters.out_discards as i64),
                    in_errors: Set(counters.in_errors as i64),
                    out_errors: Set(counters.out_errors as i64),
                    hc_in_octets: Set(counters.hc_in_octets.map(|v| v as i64)),
                    hc_out_octets: Set(counters.hc_out_octets.map(|v| v as i64)),
                    disabled: Set(false),
                    last_polled: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                active.insert(ctx.db).await.map(|_| ())
            };

            match result {
                Ok(()) => discovered.push(format!("port if_index={if_index} name={name}")),
                Err(e) => errors.push(format!("failed to persist port {if_index}: {e}")),
            }
        }

        // Mark-missing guard: never mark-all-disabled on a zero-observed pass.
        if !observed_indexes.is_empty() {
            if let Ok(existing_ports) = Ports::find()
                .filter(ports::Column::DeviceId.eq(ctx.device.id))
                .all(ctx.db)
                .await
            {
                for model in existing_ports {
                    if !observed_indexes.contains(&model.if_index) && !model.disabled {
                        let if_index = model.if_index;
                        let mut active: ports::ActiveModel = model.into();
                        active.disabled = Set(true);
                        active.updated_at = Set(chrono::Utc::now().naive_utc());
                        if active.update(ctx.db).await.is_ok() {
                            discovered.push(format!("port if_index={if_index} marked disabled"));
                        }
                    }
                }
            }
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
