use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, YmError};

fn default_database_url() -> String {
    "postgres://localhost/ymonitor".to_string()
}

fn default_timeseries_url() -> String {
    "http://localhost:8086/write".to_string()
}

fn default_timeseries_timeout_ms() -> u64 {
    5_000
}

fn default_snmp_cache_ttl_s() -> u64 {
    300
}

fn default_interface_poll_interval_s() -> u64 {
    300
}

fn default_sensor_poll_interval_s() -> u64 {
    120
}

fn default_alert_tick_interval_s() -> u64 {
    60
}

fn default_interface_batch_size() -> usize {
    10
}

fn default_sensor_batch_size() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Process-wide configuration loaded from YAML with environment
/// variable overrides, the way the teacher's settings modules layer a
/// file default under `env::var` escape hatches. `YM_` prefixes every
/// override to avoid collision with unrelated host environment vars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub timeseries: TimeseriesConfig,

    #[serde(default)]
    pub snmp: SnmpDefaultsConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interface_poll_interval_s")]
    pub interface_poll_interval_s: u64,
    #[serde(default = "default_sensor_poll_interval_s")]
    pub sensor_poll_interval_s: u64,
    #[serde(default = "default_alert_tick_interval_s")]
    pub alert_tick_interval_s: u64,
    #[serde(default = "default_interface_batch_size")]
    pub interface_batch_size: usize,
    #[serde(default = "default_sensor_batch_size")]
    pub sensor_batch_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interface_poll_interval_s: default_interface_poll_interval_s(),
            sensor_poll_interval_s: default_sensor_poll_interval_s(),
            alert_tick_interval_s: default_alert_tick_interval_s(),
            interface_batch_size: default_interface_batch_size(),
            sensor_batch_size: default_sensor_batch_size(),
        }
    }
}

impl SchedulerConfig {
    pub fn interface_poll_interval(&self) -> Duration {
        Duration::from_secs(self.interface_poll_interval_s)
    }

    pub fn sensor_poll_interval(&self) -> Duration {
        Duration::from_secs(self.sensor_poll_interval_s)
    }

    pub fn alert_tick_interval(&self) -> Duration {
        Duration::from_secs(self.alert_tick_interval_s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeseriesConfig {
    #[serde(default = "default_timeseries_url")]
    pub write_url: String,
    #[serde(default = "default_timeseries_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TimeseriesConfig {
    fn default() -> Self {
        Self {
            write_url: default_timeseries_url(),
            timeout_ms: default_timeseries_timeout_ms(),
        }
    }
}

impl TimeseriesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnmpDefaultsConfig {
    #[serde(default = "default_snmp_cache_ttl_s")]
    pub cache_ttl_s: u64,
}

impl Default for SnmpDefaultsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_s: default_snmp_cache_ttl_s(),
        }
    }
}

impl SnmpDefaultsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_s)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            scheduler: SchedulerConfig::default(),
            timeseries: TimeseriesConfig::default(),
            snmp: SnmpDefaultsConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads a YAML file if `path` exists, falling back to built-in
    /// defaults otherwise, then applies `YM_*` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if std::path::Path::new(path).exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| YmError::Internal(format!("failed to read config file {path}: {e}")))?;
            serde_yaml::from_str(&raw)
                .map_err(|e| YmError::Internal(format!("failed to parse config file {path}: {e}")))?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("YM_DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(url) = std::env::var("YM_TIMESERIES_URL") {
            self.timeseries.write_url = url;
        }
        if let Ok(level) = std::env::var("YM_LOG_LEVEL") {
            self.log_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let config = Config::default();
        assert_eq!(config.scheduler.interface_poll_interval(), Duration::from_secs(300));
        assert_eq!(config.scheduler.sensor_poll_interval(), Duration::from_secs(120));
        assert_eq!(config.scheduler.alert_tick_interval(), Duration::from_secs(60));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load("/nonexistent/path/ymonitor.yaml").unwrap();
        assert_eq!(config.database_url, default_database_url());
    }
}
