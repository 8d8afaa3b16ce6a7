use thiserror::Error;
use crate::bus::i2c::I2CError;

/// Failures reported by a bus transport while moving bytes
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I2C communication failed: {0}")]
    I2c(#[from] I2CError),

    #[error("Device {address:#04x} acknowledged {acknowledged} of {expected} byte(s)")]
    PartialAck { address: u8, expected: usize, acknowledged: usize },

    #[error("Bus does not support {0}")]
    Unsupported(&'static str),

    #[error("Bus fault: {0}")]
    Fault(String),
}

/// Errors raised by sensor drivers and register transactions
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Bus transaction failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Burst read at register {register:#04x} returned {received} of {expected} byte(s)")]
    IncompleteTransfer { register: u8, expected: usize, received: usize },

    #[error("Sensor '{sensor}' used before initialization")]
    NotInitialized { sensor: String },

    #[error("Sensor '{sensor}' wrong chip ID: expected {expected:#04x}, got {actual:#04x}")]
    WrongChipId { sensor: String, expected: u8, actual: u8 },

    #[error("Sensor '{sensor}' initialization failed: {source}")]
    InitError {
        sensor: String,
        #[source]
        source: Box<SensorError>,
    },

    #[error("Unsupported sensor driver: '{driver}'")]
    UnsupportedDriver { driver: String },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format in '{path}': {source}")]
    FormatError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Output sink errors
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Output '{sink}' I/O failed: {source}")]
    Io {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sample serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MAVLink protocol error: {0}")]
    Mavlink(String),
}

/// Registry and initialization errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Configuration rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("Bus '{bus}' not found or unavailable")]
    BusNotFound { bus: String },

    #[error("Bus '{bus}' could not be opened: {source}")]
    BusOpenError {
        bus: String,
        #[source]
        source: TransportError,
    },

    #[error("Sensor registration failed: {0}")]
    RegistrationError(#[source] SensorError),
}

/// Result type aliases for convenience
pub type TransportResult<T> = Result<T, TransportError>;
pub type SensorResult<T> = Result<T, SensorError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type OutputResult<T> = Result<T, OutputError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
