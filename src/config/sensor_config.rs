use super::load_toml;
use crate::errors::{ConfigError, ConfigResult};
use crate::sensors::registers::MPU6050_ADDRESS;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Polling period used when a sensor entry does not set one
pub const DEFAULT_PERIOD_MS: u64 = 200;

/// Root configuration struct expecting `[[sensor]]` TOML array format
#[derive(Debug, Deserialize)]
pub struct SensorConfig {
    #[serde(rename = "sensor")]
    pub sensors: Vec<SensorEntry>,
}

/// One sensor entry, matching each `[[sensor]]` section
#[derive(Debug, Deserialize)]
pub struct SensorEntry {
    pub id: String,
    pub driver: String,
    pub bus: String,
    #[serde(default = "default_address")]
    pub address: u8,
    /// Delay between sampling cycles
    pub period_ms: Option<u64>,
    /// Fail startup when WHO_AM_I does not match
    #[serde(default)]
    pub strict_identity: bool,
}

fn default_address() -> u8 {
    MPU6050_ADDRESS
}

impl SensorEntry {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.unwrap_or(DEFAULT_PERIOD_MS))
    }
}

impl SensorConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for s in &self.sensors {
            if !seen.insert(s.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "sensor.id".to_string(),
                    reason: format!("duplicate sensor id '{}'", s.id),
                });
            }
            if s.address > 0x7F {
                return Err(ConfigError::InvalidValue {
                    field: format!("sensor.{}.address", s.id),
                    reason: format!("{:#04x} is not a 7-bit address", s.address),
                });
            }
            if s.period_ms == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: format!("sensor.{}.period_ms", s.id),
                    reason: "period must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Loads config from TOML file
pub fn load_sensor_config(path: &str) -> ConfigResult<SensorConfig> {
    let parsed: SensorConfig = load_toml(path)?;
    parsed.validate()?;
    Ok(parsed)
}
