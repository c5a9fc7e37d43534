use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{Result, YmError};
use crate::models::device::SnmpConfig;

const MAX_OIDS_PER_REQUEST: usize = 100;
const MAX_BULK_REPETITIONS: i64 = 100;

fn is_rfc1123_hostname(value: &str) -> bool {
    if value.is_empty() || value.len() > 253 {
        return false;
    }
    value.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

fn is_valid_hostname_or_address(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok() || value.parse::<Ipv6Addr>().is_ok() || is_rfc1123_hostname(value)
}

/// Confirms the device's SNMP config is internally consistent before a
/// session is opened, accumulating every failure rather than returning
/// on the first, per spec.md §4.3.
pub fn validate_device(hostname: &str, config: &SnmpConfig) -> Result<()> {
    use crate::models::device::{AuthLevel, SnmpVersion};

    let mut errors = Vec::new();

    if !is_valid_hostname_or_address(hostname) {
        errors.push(format!("invalid hostname or address: {hostname}"));
    }
    if config.port == 0 {
        errors.push("snmp port must be in [1,65535]".to_string());
    }
    if config.timeout_ms < 1000 {
        errors.push("snmp timeout_ms must be >= 1000".to_string());
    }
    if config.retries > 10 {
        errors.push("snmp retries must be in [0,10]".to_string());
    }

    match config.version {
        SnmpVersion::V1 | SnmpVersion::V2c => {
            if config.community.is_none() {
                errors.push("community is required for v1/v2c".to_string());
            }
        }
        SnmpVersion::V3 => {
            if config.username.is_none() {
                errors.push("username is required for v3".to_string());
            }
            match config.auth_level {
                Some(AuthLevel::Auth) | Some(AuthLevel::AuthPriv) => match &config.auth_secret {
                    Some(secret) if config.auth_protocol.is_some() && secret.len() >= 8 => {}
                    _ => errors.push(
                        "auth protocol and an auth secret of at least 8 characters are required for authNoPriv/authPriv"
                            .to_string(),
                    ),
                },
                _ => {}
            }
            if matches!(config.auth_level, Some(AuthLevel::AuthPriv))
                && (config.priv_protocol.is_none() || config.priv_secret.is_none())
            {
                errors.push("priv protocol and secret are required for authPriv".to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(YmError::ValidationFailed(errors))
    }
}

/// Checks an OID is a non-empty sequence of non-negative integer arcs,
/// the first arc in {0,1,2}, the second arc <= 39 when the first is
/// less than 2, and no arc carries a leading zero.
pub fn validate_oid(oid: &str) -> Result<()> {
    let trimmed = oid.trim_start_matches('.');
    let arcs: Vec<&str> = trimmed.split('.').collect();
    let well_formed = !trimmed.is_empty()
        && arcs.iter().all(|arc| {
            !arc.is_empty() && arc.chars().all(|c| c.is_ascii_digit()) && (arc == &"0" || !arc.starts_with('0'))
        });
    if !well_formed {
        return Err(YmError::ValidationFailed(vec![format!("malformed OID: {oid}")]));
    }
    let first: u32 = arcs[0].parse().unwrap_or(u32::MAX);
    if first > 2 {
        return Err(YmError::ValidationFailed(vec![format!(
            "OID {oid} first arc must be 0, 1, or 2"
        )]));
    }
    if first < 2 {
        let second: u32 = arcs.get(1).and_then(|a| a.parse().ok()).unwrap_or(u32::MAX);
        if second > 39 {
            return Err(YmError::ValidationFailed(vec![format!(
                "OID {oid} second arc must be <= 39 when the first arc is 0 or 1"
            )]));
        }
    }
    Ok(())
}

/// Rejects empty lists, duplicates, and lists over the per-request cap.
pub fn validate_oid_list(oids: &[String]) -> Result<()> {
    if oids.is_empty() {
        return Err(YmError::ValidationFailed(vec!["at least one OID is required".to_string()]));
    }
    if oids.len() > MAX_OIDS_PER_REQUEST {
        return Err(YmError::ValidationFailed(vec![format!(
            "too many OIDs in one request: {} (max {MAX_OIDS_PER_REQUEST})",
            oids.len()
        )]));
    }
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for oid in oids {
        if let Err(YmError::ValidationFailed(msgs)) = validate_oid(oid) {
            errors.extend(msgs);
        }
        if !seen.insert(oid.as_str()) {
            errors.push(format!("duplicate OID in request: {oid}"));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(YmError::ValidationFailed(errors))
    }
}

pub fn validate_bulk_parameters(non_repeaters: i64, max_repetitions: i64) -> Result<()> {
    let mut errors = Vec::new();
    if !(0..=MAX_BULK_REPETITIONS).contains(&non_repeaters) {
        errors.push(format!("non_repeaters must be between 0 and {MAX_BULK_REPETITIONS}"));
    }
    if max_repetitions <= 0 || max_repetitions > MAX_BULK_REPETITIONS {
        errors.push(format!("max_repetitions must be between 1 and {MAX_BULK_REPETITIONS}"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(YmError::ValidationFailed(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_oid() {
        assert!(validate_oid("1.3.6.1.2.1.1.1.0").is_ok());
        assert!(validate_oid(".1.3.6.1.2.1.1.1.0").is_ok());
    }

    #[test]
    fn rejects_malformed_oid() {
        assert!(validate_oid("1.3.6.a.1").is_err());
        assert!(validate_oid("").is_err());
        assert!(validate_oid("1.3.06.1").is_err());
    }

    #[test]
    fn rejects_second_arc_over_39_when_first_below_2() {
        assert!(validate_oid("1.40.1").is_err());
        assert!(validate_oid("2.40.1").is_ok());
    }

    #[test]
    fn rejects_too_many_oids() {
        let oids: Vec<String> = (0..101).map(|i| format!("1.3.6.1.2.1.1.{i}")).collect();
        assert!(validate_oid_list(&oids).is_err());
    }

    #[test]
    fn rejects_duplicate_oids() {
        let oids = vec!["1.3.6.1.2.1.1.1.0".to_string(), "1.3.6.1.2.1.1.1.0".to_string()];
        assert!(validate_oid_list(&oids).is_err());
    }

    #[test]
    fn bulk_parameters_capped_at_100() {
        assert!(validate_bulk_parameters(0, 100).is_ok());
        assert!(validate_bulk_parameters(0, 101).is_err());
        assert!(validate_bulk_parameters(101, 1).is_err());
    }

    #[test]
    fn v3_without_username_fails() {
        let mut config = SnmpConfig {
            version: crate::models::device::SnmpVersion::V3,
            ..Default::default()
        };
        config.community = None;
        assert!(validate_device("10.0.0.1", &config).is_err());
    }

    #[test]
    fn rejects_malformed_hostname() {
        let config = SnmpConfig::default();
        assert!(validate_device("not a hostname!", &config).is_err());
        assert!(validate_device("switch-1.example.com", &config).is_ok());
    }
}
