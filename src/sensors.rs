use crate::bus::transport::Transport;
use crate::errors::{SensorError, SensorResult};
use async_trait::async_trait;

pub mod decoder;
pub mod mpu6050;
pub mod register_access;
pub mod registers;

pub use decoder::{decode, PhysicalSample, RawSample};
pub use mpu6050::Mpu6050;
pub use register_access::RegisterAccess;

/// A polled sensor bound to one bus
///
/// `init` runs once before sampling starts; a failure there is fatal.
/// `read` runs once per scheduler cycle and may fail without side effects.
#[async_trait]
pub trait SensorDriver: Send + Sync {
    async fn init(&mut self, bus: &mut dyn Transport) -> SensorResult<()>;
    async fn read(&self, bus: &mut dyn Transport) -> SensorResult<PhysicalSample>;
    fn id(&self) -> &str;
    fn bus(&self) -> &str;
}

pub fn create_sensor_driver(
    driver: &str,
    id: String,
    address: u8,
    bus_id: String,
    strict_identity: bool,
) -> SensorResult<Box<dyn SensorDriver>> {
    match driver {
        "mpu6050" => Ok(Box::new(
            Mpu6050::new(id, address, bus_id).with_strict_identity(strict_identity),
        )),
        _ => Err(SensorError::UnsupportedDriver { driver: driver.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_driver() {
        let sensor = create_sensor_driver("mpu6050", "imu0".into(), 0x68, "i2c1".into(), false).unwrap();
        assert_eq!(sensor.id(), "imu0");
        assert_eq!(sensor.bus(), "i2c1");
    }

    #[test]
    fn test_create_unknown_driver() {
        let result = create_sensor_driver("lsm6dsl", "imu0".into(), 0x6A, "i2c1".into(), false);
        assert!(matches!(result, Err(SensorError::UnsupportedDriver { .. })));
    }
}
