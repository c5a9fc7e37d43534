use serde::{Deserialize, Serialize};

/// A single environment-sensor entry an OS template contributes to the
/// Sensors discovery module, per spec.md §4.4.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorTemplateEntry {
    pub sensor_type: String,
    pub oid: String,
    pub descr: String,
    #[serde(default)]
    pub skip_if: Option<String>,
    #[serde(default)]
    pub skip_if_zero: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OsTemplate {
    pub os: String,
    #[serde(default)]
    pub sys_object_id_prefixes: Vec<String>,
    #[serde(default)]
    pub sys_descr_keywords: Vec<String>,
    #[serde(default)]
    pub ignore_if: Vec<String>,
    #[serde(default)]
    pub ignore_type: Vec<i32>,
    #[serde(default)]
    pub is_cisco_family: bool,
    #[serde(default)]
    pub sensors: Vec<SensorTemplateEntry>,
}

/// Default ignore patterns applied on top of any template, per
/// spec.md §4.4's Ports module description.
pub const DEFAULT_IGNORE_IF: &[&str] = &["^lo", "^null", "^tunnel", "^vlan1$"];
pub const DEFAULT_IGNORE_TYPES: &[i32] = &[24, 131];

/// Precedence order OS detection walks, most to least specific.
pub const OS_PRECEDENCE: &[&str] = &[
    "cisco-ios",
    "cisco-nxos",
    "cisco-asa",
    "cisco-generic",
    "junos",
    "arista-eos",
    "hp-procurve",
    "vmware-esxi",
    "linux",
    "windows",
    "generic",
];

fn templates() -> Vec<OsTemplate> {
    vec![
        OsTemplate {
            os: "cisco-ios".to_string(),
            sys_object_id_prefixes: vec!["1.3.6.1.4.1.9.1".to_string()],
            sys_descr_keywords: vec!["cisco ios".to_string(), "ios software".to_string()],
            is_cisco_family: true,
            ..Default::default()
        },
        OsTemplate {
            os: "cisco-nxos".to_string(),
            sys_object_id_prefixes: vec!["1.3.6.1.4.1.9.12".to_string()],
            sys_descr_keywords: vec!["nx-os".to_string()],
            is_cisco_family: true,
            ..Default::default()
        },
        OsTemplate {
            os: "cisco-asa".to_string(),
            sys_object_id_prefixes: vec!["1.3.6.1.4.1.9.1.745".to_string()],
            sys_descr_keywords: vec!["adaptive security appliance".to_string(), "asa".to_string()],
            is_cisco_family: true,
            ..Default::default()
        },
        OsTemplate {
            os: "cisco-generic".to_string(),
            sys_object_id_prefixes: vec!["1.3.6.1.4.1.9".to_string()],
            sys_descr_keywords: vec!["cisco".to_string()],
            is_cisco_family: true,
            ..Default::default()
        },
        OsTemplate {
            os: "junos".to_string(),
            sys_object_id_prefixes: vec!["1.3.6.1.4.1.2636".to_string()],
            sys_descr_keywords: vec!["junos".to_string()],
            ..Default::default()
        },
        OsTemplate {
            os: "arista-eos".to_string(),
            sys_object_id_prefixes: vec!["1.3.6.1.4.1.30065".to_string()],
            sys_descr_keywords: vec!["arista networks eos".to_string(), "eos".to_string()],
            ..Default::default()
        },
        OsTemplate {
            os: "hp-procurve".to_string(),
            sys_object_id_prefixes: vec!["1.3.6.1.4.1.11.2.3.7".to_string()],
            sys_descr_keywords: vec!["procurve".to_string()],
            ..Default::default()
        },
        OsTemplate {
            os: "vmware-esxi".to_string(),
            sys_object_id_prefixes: vec!["1.3.6.1.4.1.6876".to_string()],
            sys_descr_keywords: vec!["vmware esx".to_string(), "esxi".to_string()],
            ..Default::default()
        },
        OsTemplate {
            os: "linux".to_string(),
            sys_descr_keywords: vec!["linux".to_string()],
            ..Default::default()
        },
        OsTemplate {
            os: "windows".to_string(),
            sys_descr_keywords: vec!["windows".to_string()],
            ..Default::default()
        },
        OsTemplate {
            os: "generic".to_string(),
            ..Default::default()
        },
    ]
}

pub fn load(os: &str) -> OsTemplate {
    templates()
        .into_iter()
        .find(|t| t.os == os)
        .unwrap_or_else(|| OsTemplate {
            os: "generic".to_string(),
            ..Default::default()
        })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsDetection {
    pub os: String,
    pub confidence: u8,
}

/// OS detection: sysObjectID prefix match first (confidence 90), then
/// sysDescr keyword match (70-80), else generic (50 if any sysDescr
/// text present, 0 if empty), per spec.md §4.5.
pub fn detect_os(sys_object_id: Option<&str>, sys_descr: Option<&str>) -> OsDetection {
    let descr_lower = sys_descr.unwrap_or_default().to_lowercase();

    for os in OS_PRECEDENCE {
        if *os == "generic" {
            continue;
        }
        let template = load(os);
        if let Some(oid) = sys_object_id {
            let oid = oid.trim_start_matches('.');
            if template.sys_object_id_prefixes.iter().any(|p| oid.starts_with(p.as_str())) {
                return OsDetection {
                    os: os.to_string(),
                    confidence: 90,
                };
            }
        }
    }

    for os in OS_PRECEDENCE {
        if *os == "generic" {
            continue;
        }
        let template = load(os);
        if template.sys_descr_keywords.iter().any(|kw| descr_lower.contains(kw.as_str())) {
            return OsDetection {
                os: os.to_string(),
                confidence: 75,
            };
        }
    }

    OsDetection {
        os: "generic".to_string(),
        confidence: if descr_lower.is_empty() { 0 } else { 50 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_cisco_ios_by_object_id() {
        let d = detect_os(Some("1.3.6.1.4.1.9.1.1"), Some("Cisco IOS Software, C2900"));
        assert_eq!(d.os, "cisco-ios");
        assert_eq!(d.confidence, 90);
    }

    #[test]
    fn detects_arista_by_descr() {
        let d = detect_os(None, Some("Arista Networks EOS version 4.2"));
        assert_eq!(d.os, "arista-eos");
        assert_eq!(d.confidence, 75);
    }

    #[test]
    fn falls_back_to_generic_with_zero_confidence() {
        let d = detect_os(None, None);
        assert_eq!(d.os, "generic");
        assert_eq!(d.confidence, 0);
    }
}
