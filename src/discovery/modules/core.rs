use async_trait::async_trait;
use sea_orm::*;
use tracing::warn;

use crate::discovery::modules::{DiscoveryContext, DiscoveryModule, ModuleResult};
use crate::models::device::Device;
use crate::models::entities::{devices, prelude::*};

const OID_SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";
const OID_SYS_OBJECT_ID: &str = "1.3.6.1.2.1.1.2.0";
const OID_SYS_UPTIME: &str = "1.3.6.1.2.1.1.3.0";
const OID_SYS_CONTACT: &str = "1.3.6.1.2.1.1.4.0";
const OID_SYS_NAME: &str = "1.3.6.1.2.1.1.5.0";
const OID_SYS_LOCATION: &str = "1.3.6.1.2.1.1.6.0";
const OID_SYS_SERVICES: &str = "1.3.6.1.2.1.1.7.0";

const ENTITY_PHYSICAL_VENDOR_TYPE: &str = "1.3.6.1.2.1.47.1.1.1.1.12.1";
const ENTITY_PHYSICAL_MODEL: &str = "1.3.6.1.2.1.47.1.1.1.1.13.1";
const ENTITY_PHYSICAL_SERIAL: &str = "1.3.6.1.2.1.47.1.1.1.1.11.1";

pub struct CoreModule;

/// Features implied by the sysServices bitmap, per spec.md §4.4.
const SERVICE_BITS: &[(u8, &str)] = &[
    (1, "physical"),
    (2, "datalink"),
    (4, "internet"),
    (8, "end-to-end"),
    (64, "applications"),
];

const DESCR_KEYWORDS: &[(&str, &str)] = &[
    ("router", "routing"),
    ("switch", "switching"),
    ("wireless", "wireless"),
    ("firewall", "firewall"),
    ("load balancer", "loadbalancer"),
    ("loadbalancer", "loadbalancer"),
];

fn detect_features(sys_services: Option<i64>, sys_descr: &str) -> Vec<String> {
    let mut features = Vec::new();
    if let Some(bitmap) = sys_services {
        for (bit, name) in SERVICE_BITS {
            if bitmap & (*bit as i64) != 0 {
                features.push(name.to_string());
            }
        }
    }
    let lower = sys_descr.to_lowercase();
    for (keyword, name) in DESCR_KEYWORDS {
        if lower.contains(keyword) {
            features.push(name.to_string());
        }
    }
    features.sort();
    features.dedup();
    features
}

#[async_trait]
impl DiscoveryModule for CoreModule {
    fn name(&self) -> &'static str {
        "core"
    }

    fn description(&self) -> &'static str {
        "System group, host-resources, and Entity-MIB chassis identification"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    fn priority(&self) -> u8 {
        1
    }

    fn can_discover(&self, _device: &Device) -> bool {
        true
    }

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> ModuleResult {
        let started_at = chrono::Utc::now();
        let mut discovered = Vec::new();
        let mut errors = Vec::new();

        let oids = vec![
            OID_SYS_DESCR.to_string(),
            OID_SYS_OBJECT_ID.to_string(),
            OID_SYS_UPTIME.to_string(),
            OID_SYS_CONTACT.to_string(),
            OID_SYS_NAME.to_string(),
            OID_SYS_LOCATION.to_string(),
            OID_SYS_SERVICES.to_string(),
        ];

        let varbinds = match ctx
            .transport
            .get(&ctx.device.address, &ctx.device.snmp_config, &oids)
            .await
        {
            Ok(vbs) => vbs,
            Err(e) => {
                errors.push(format!("system group GET failed: {e}"));
                return ModuleResult {
                    success: false,
                    module: self.name().to_string(),
                    device_id: ctx.device.id,
                    discovered,
                    errors,
                    started_at,
                    duration_ms: 0,
                };
            }
        };

        let find = |oid: &str| varbinds.iter().find(|v| v.oid == oid).map(|v| v.value.as_display_string());
        let sys_descr = find(OID_SYS_DESCR).unwrap_or_default();
        let sys_object_id = find(OID_SYS_OBJECT_ID);
        let sys_uptime = find(OID_SYS_UPTIME).and_then(|s| s.parse::<i64>().ok());
        let sys_services = find(OID_SYS_SERVICES).and_then(|s| s.parse::<i64>().ok());

        let features = detect_features(sys_services, &sys_descr);
        discovered.push(format!("sysDescr={sys_descr}"));
        discovered.extend(features.iter().map(|f| format!("feature={f}")));

        let detection = crate::discovery::os_template::detect_os(sys_object_id.as_deref(), Some(&sys_descr));

        let vendor_model_serial = ctx
            .transport
            .get(
                &ctx.device.address,
                &ctx.device.snmp_config,
                &[
                    ENTITY_PHYSICAL_VENDOR_TYPE.to_string(),
                    ENTITY_PHYSICAL_MODEL.to_string(),
                    ENTITY_PHYSICAL_SERIAL.to_string(),
                ],
            )
            .await
            .unwrap_or_default();
        let vendor_value = vendor_model_serial
            .iter()
            .find(|v| v.oid == ENTITY_PHYSICAL_VENDOR_TYPE)
            .map(|v| v.value.as_display_string());
        let model_value = vendor_model_serial
            .iter()
            .find(|v| v.oid == ENTITY_PHYSICAL_MODEL)
            .map(|v| v.value.as_display_string());
        let serial_value = vendor_model_serial
            .iter()
            .find(|v| v.oid == ENTITY_PHYSICAL_SERIAL)
            .map(|v| v.value.as_display_string());

        if let Some(existing) = Devices::find_by_id(ctx.device.id).one(ctx.db).await.ok().flatten() {
            let mut active: devices::ActiveModel = existing.into();
            active.os = Set(Some(detection.os.clone()));
            if let Some(v) = vendor_value {
                active.vendor = Set(Some(v));
            }
            if let Some(m) = model_value {
                active.model = Set(Some(m));
            }
            active.serial = Set(serial_value);
            active.uptime = Set(sys_uptime);
            active.last_discovered = Set(Some(chrono::Utc::now().naive_utc()));
            active.updated_at = Set(chrono::Utc::now().naive_utc());
            if let Err(e) = active.update(ctx.db).await {
                errors.push(format!("failed to persist device record: {e}"));
            }
        } else {
            warn!(device_id = %ctx.device.id, "device vanished mid-discovery");
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
