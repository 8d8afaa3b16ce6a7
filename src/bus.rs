pub mod i2c;
pub mod mock;
pub mod serial;
pub mod transport;

#[cfg(feature = "mavlink_telemetry")]
pub mod mavlink;

pub use transport::{BusCondition, SharedBus, Transport};

/// Bus type enum for different communication interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusType {
    I2C,
}

impl BusType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i2c" => Some(BusType::I2C),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_type_is_case_insensitive() {
        assert_eq!(BusType::from_str("I2C"), Some(BusType::I2C));
        assert_eq!(BusType::from_str("i2c"), Some(BusType::I2C));
        assert_eq!(BusType::from_str("spi"), None);
    }
}
