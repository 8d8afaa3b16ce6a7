use super::load_toml;
use crate::errors::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;

/// Default UART baud rate for serial outputs
pub const DEFAULT_SERIAL_BAUD: u32 = 115_200;

/// Root structure for `[[output]]` entries
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "output", default)]
    pub outputs: Vec<OutputEntry>,
}

/// One output sink, selected by `kind`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputEntry {
    /// Human-readable lines on stdout
    Console,
    /// One JSON object per sample on stdout
    Json,
    /// Human-readable lines on a UART
    Serial { path: String, baud: Option<u32> },
    /// MAVLink SCALED_IMU messages on a UART
    Mavlink {
        path: String,
        baud: Option<u32>,
        system_id: Option<u8>,
        component_id: Option<u8>,
    },
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { outputs: vec![OutputEntry::Console] }
    }
}

/// Load output config; a missing file means console output only
pub fn load_output_config(path: &str) -> ConfigResult<OutputConfig> {
    if !Path::new(path).exists() {
        return Ok(OutputConfig::default());
    }
    let parsed: OutputConfig = load_toml(path)?;
    if parsed.outputs.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "output".to_string(),
            reason: "at least one output is required".to_string(),
        });
    }
    Ok(parsed)
}
