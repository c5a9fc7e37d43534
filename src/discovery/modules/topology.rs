use async_trait::async_trait;
use chrono::Duration;
use sea_orm::*;

use crate::discovery::modules::{DiscoveryContext, DiscoveryModule, ModuleResult};
use crate::models::device::Device;
use crate::models::entities::{prelude::*, topology};
use crate::models::topology::TopologyLink;

const LLDP_REM_CHASSIS_ID: &str = "1.0.8802.1.1.2.1.4.1.1.5";
const LLDP_REM_PORT_ID: &str = "1.0.8802.1.1.2.1.4.1.1.7";
const LLDP_REM_SYS_NAME: &str = "1.0.8802.1.1.2.1.4.1.1.9";
const LLDP_REM_SYS_DESC: &str = "1.0.8802.1.1.2.1.4.1.1.10";

const CDP_CACHE_DEVICE_ID: &str = "1.3.6.1.4.1.9.9.23.1.2.1.1.6";
const CDP_CACHE_DEVICE_PORT: &str = "1.3.6.1.4.1.9.9.23.1.2.1.1.7";
const CDP_CACHE_PLATFORM: &str = "1.3.6.1.4.1.9.9.23.1.2.1.1.8";

pub struct TopologyModule;

#[async_trait]
impl DiscoveryModule for TopologyModule {
    fn name(&self) -> &'static str {
        "topology"
    }

    fn description(&self) -> &'static str {
        "LLDP (and, for Cisco devices, CDP) neighbor adjacency discovery"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["core", "ports"]
    }

    fn priority(&self) -> u8 {
        5
    }

    fn can_discover(&self, _device: &Device) -> bool {
        true
    }

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> ModuleResult {
        let started_at = chrono::Utc::now();
        let mut discovered = Vec::new();
        let mut errors = Vec::new();
        let mut observed_any = false;

        let chassis = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, LLDP_REM_CHASSIS_ID)
            .await
            .unwrap_or_default();
        let port_ids = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, LLDP_REM_PORT_ID)
            .await
            .unwrap_or_default();
        let sys_names = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, LLDP_REM_SYS_NAME)
            .await
            .unwrap_or_default();
        let sys_descrs = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, LLDP_REM_SYS_DESC)
            .await
            .unwrap_or_default();

        for (i, vb) in chassis.iter().enumerate() {
            let remote_chassis_id = Some(vb.value.as_display_string());
            let remote_port_id = port_ids.get(i).map(|v| v.value.as_display_string()).unwrap_or_default();
            let remote_hostname = sys_names.get(i).map(|v| v.value.as_display_string()).unwrap_or_default();
            let remote_platform = sys_descrs.get(i).map(|v| v.value.as_display_string());
            if remote_hostname.is_empty() {
                continue;
            }
            observed_any = true;

            match TopologyLink::upsert(
                ctx.db,
                ctx.device.id,
                "unknown",
                "lldp",
                remote_chassis_id,
                &remote_port_id,
                &remote_hostname,
                remote_platform,
            )
            .await
            {
                Ok(_) => discovered.push(format!("lldp neighbor {remote_hostname}")),
                Err(e) => errors.push(format!("failed to persist lldp neighbor: {e}")),
            }
        }

        if ctx.os_template.is_cisco_family {
            let device_ids = ctx
                .transport
                .walk(&ctx.device.address, &ctx.device.snmp_config, CDP_CACHE_DEVICE_ID)
                .await
                .unwrap_or_default();
            let device_ports = ctx
                .transport
                .walk(&ctx.device.address, &ctx.device.snmp_config, CDP_CACHE_DEVICE_PORT)
                .await
                .unwrap_or_default();
            let platforms = ctx
                .transport
                .walk(&ctx.device.address, &ctx.device.snmp_config, CDP_CACHE_PLATFORM)
                .await
                .unwrap_or_default();

            for (i, vb) in device_ids.iter().enumerate() {
                let remote_hostname = vb.value.as_display_string();
                if remote_hostname.is_empty() {
                    continue;
                }
                observed_any = true;
                let remote_port_id = device_ports.get(i).map(|v| v.value.as_display_string()).unwrap_or_default();
                let remote_platform = platforms.get(i).map(|v| v.value.as_display_string());

                match TopologyLink::upsert(
                    ctx.db,
                    ctx.device.id,
                    "unknown",
                    "cdp",
                    None,
                    &remote_port_id,
                    &remote_hostname,
                    remote_platform,
                )
                .await
                {
                    Ok(_) => discovered.push(format!("cdp neighbor {remote_hostname}")),
                    Err(e) => errors.push(format!("failed to persist cdp neighbor: {e}")),
                }
            }
        }

        // Prune stale, not-re-observed links older than 24h, but never on
        // a pass that observed zero neighbors (spec.md §4.4).
        if observed_any {
            if let Ok(stale) = Topology::find()
                .filter(topology::Column::DeviceId.eq(ctx.device.id))
                .filter(topology::Column::LastUpdated.lt((chrono::Utc::now() - Duration::hours(24)).naive_utc()))
                .all(ctx.db)
                .await
            {
                for model in stale {
                    let id = model.id;
                    let mut active: topology::ActiveModel = model.into();
                    active.active = Set(false);
                    if active.update(ctx.db).await.is_ok() {
                        discovered.push(format!("pruned stale topology link {id}"));
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
