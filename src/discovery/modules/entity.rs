use async_trait::async_trait;

use crate::discovery::modules::{DiscoveryContext, DiscoveryModule, ModuleResult};
use crate::models::device::Device;

const ENT_PHYSICAL_DESCR: &str = "1.3.6.1.2.1.47.1.1.1.1.2";
const ENT_PHYSICAL_CLASS: &str = "1.3.6.1.2.1.47.1.1.1.1.5";
const ENT_PHYSICAL_NAME: &str = "1.3.6.1.2.1.47.1.1.1.1.7";
const ENT_PHYSICAL_CONTAINED_IN: &str = "1.3.6.1.2.1.47.1.1.1.1.4";

/// entPhysicalClass codes mapped to friendly names, per spec.md §4.4.
fn class_name(code: i64) -> &'static str {
    match code {
        1 => "other",
        2 => "unknown",
        3 => "chassis",
        4 => "backplane",
        5 => "container",
        6 => "powerSupply",
        7 => "fan",
        8 => "sensor",
        9 => "module",
        10 => "port",
        11 => "stack",
        12 => "cpu",
        _ => "unknown",
    }
}

pub struct EntityModule;

#[async_trait]
impl DiscoveryModule for EntityModule {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn description(&self) -> &'static str {
        "Entity-MIB physical table walk, building the chassis hierarchy"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["core"]
    }

    fn priority(&self) -> u8 {
        4
    }

    fn can_discover(&self, _device: &Device) -> bool {
        true
    }

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> ModuleResult {
        let started_at = chrono::Utc::now();
        let mut discovered = Vec::new();
        let mut errors = Vec::new();

        let descr = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, ENT_PHYSICAL_DESCR)
            .await;
        let class = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, ENT_PHYSICAL_CLASS)
            .await;
        let name = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, ENT_PHYSICAL_NAME)
            .await;
        let contained_in = ctx
            .transport
            .walk(&ctx.device.address, &ctx.device.snmp_config, ENT_PHYSICAL_CONTAINED_IN)
            .await;

        match (descr, class, name, contained_in) {
            (Ok(descr), Ok(class), Ok(names), Ok(contained)) => {
                let index_of = |oid: &str, base: &str| {
                    oid.strip_prefix(&format!("{base}.")).and_then(|s| s.parse::<i32>().ok())
                };
                for vb in &descr {
                    let Some(index) = index_of(&vb.oid, ENT_PHYSICAL_DESCR) else { continue };
                    let class_code = class
                        .iter()
                        .find(|v| index_of(&v.oid, ENT_PHYSICAL_CLASS) == Some(index))
                        .and_then(|v| v.value.as_i64())
                        .unwrap_or(2);
                    let parent = contained
                        .iter()
                        .find(|v| index_of(&v.oid, ENT_PHYSICAL_CONTAINED_IN) == Some(index))
                        .and_then(|v| v.value.as_i64())
                        .unwrap_or(0);
                    let entity_name = names
                        .iter()
                        .find(|v| index_of(&v.oid, ENT_PHYSICAL_NAME) == Some(index))
                        .map(|v| v.value.as_display_string())
                        .unwrap_or_default();
                    discovered.push(format!(
                        "entity index={index} class={} name={entity_name} parent={parent} descr={}",
                        class_name(class_code),
                        vb.value.as_display_string()
                    ));
                }
            }
            _ => errors.push("one or more entity-MIB column walks failed".to_string()),
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
