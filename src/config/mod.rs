pub mod bus_config;
pub mod output_config;
pub mod sensor_config;

pub use bus_config::{load_bus_config, BusConfig, BusEntry};
pub use output_config::{load_output_config, OutputConfig, OutputEntry};
pub use sensor_config::{load_sensor_config, SensorConfig, SensorEntry};

use crate::errors::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;
use std::fs;

/// Default configuration directory, overridden by `CONFIG_PATH`
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Get the configuration path (allow override via CONFIG_PATH env var)
pub fn get_config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string())
}

/// Read and parse one TOML file
fn load_toml<T: DeserializeOwned>(path: &str) -> ConfigResult<T> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
        path: path.to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::FormatError {
        path: path.to_string(),
        source,
    })
}
