use super::load_toml;
use crate::bus::BusType;
use crate::errors::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::collections::HashSet;

/// Root structure for loading `[[bus]]` style TOML config
#[derive(Debug, Deserialize)]
pub struct BusConfig {
    #[serde(rename = "bus")]
    pub buses: Vec<BusEntry>,
}

/// One bus entry
#[derive(Debug, Deserialize)]
pub struct BusEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: String, // 'type' is a reserved word in Rust, use raw identifier
    pub path: String,
}

impl BusConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for b in &self.buses {
            if BusType::from_str(&b.r#type).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: format!("bus.{}.type", b.id),
                    reason: format!("unknown bus type '{}'", b.r#type),
                });
            }
            if !seen.insert(b.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "bus.id".to_string(),
                    reason: format!("duplicate bus id '{}'", b.id),
                });
            }
        }
        Ok(())
    }
}

/// Load bus config file
pub fn load_bus_config(path: &str) -> ConfigResult<BusConfig> {
    let parsed: BusConfig = load_toml(path)?;
    parsed.validate()?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bus_config() {
        let cfg: BusConfig = toml::from_str(
            r#"
            [[bus]]
            id = "i2c1"
            type = "i2c"
            path = "/dev/i2c-1"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.buses.len(), 1);
        assert_eq!(cfg.buses[0].path, "/dev/i2c-1");
        cfg.validate().unwrap();
    }

    #[test]
    fn test_reject_unknown_bus_type() {
        let cfg: BusConfig = toml::from_str(
            r#"
            [[bus]]
            id = "spi0"
            type = "spi"
            path = "/dev/spidev0.0"
            "#,
        )
        .unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidValue { .. })));
    }
}
