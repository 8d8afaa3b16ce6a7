use crate::bus::i2c::I2CBus;
use crate::bus::transport::{shared, SharedBus};
use crate::bus::BusType;
use crate::config::{BusConfig, SensorConfig};
use crate::errors::{ConfigError, RegistryError, RegistryResult, TransportError};
use crate::sensors::{create_sensor_driver, SensorDriver};
use std::collections::HashMap;
use tracing::info;

/// Open every configured bus
pub fn open_buses(bus_cfg: &BusConfig) -> RegistryResult<HashMap<String, SharedBus>> {
    let mut bus_map = HashMap::new();
    for b in bus_cfg.buses.iter() {
        match BusType::from_str(&b.r#type) {
            Some(BusType::I2C) => {
                let bus = I2CBus::new(&b.path).map_err(|e| RegistryError::BusOpenError {
                    bus: b.id.clone(),
                    source: TransportError::from(e),
                })?;
                info!("[registry] opened bus {} ({})", b.id, b.path);
                bus_map.insert(b.id.clone(), shared(Box::new(bus)));
            }
            None => {
                return Err(RegistryError::Config(ConfigError::InvalidValue {
                    field: format!("bus.{}.type", b.id),
                    reason: format!("unknown bus type '{}'", b.r#type),
                }));
            }
        }
    }
    Ok(bus_map)
}

/// Create and initialize every configured sensor
///
/// Initialization is fatal: the first sensor that fails aborts startup.
pub async fn init_sensors(
    sensor_config: &SensorConfig,
    buses: &HashMap<String, SharedBus>,
) -> RegistryResult<Vec<Box<dyn SensorDriver>>> {
    let mut sensors: Vec<Box<dyn SensorDriver>> = Vec::new();
    info!("[registry] initializing {} sensor(s)...", sensor_config.sensors.len());
    for s in sensor_config.sensors.iter() {
        let mut sensor = create_sensor_driver(&s.driver, s.id.clone(), s.address, s.bus.clone(), s.strict_identity)
            .map_err(RegistryError::RegistrationError)?;
        info!(
            "[registry] registering sensor: id={} driver={} bus={} address={:#04x}",
            s.id, s.driver, s.bus, s.address
        );

        let bus_arc = buses
            .get(&s.bus)
            .ok_or_else(|| RegistryError::BusNotFound { bus: s.bus.clone() })?;
        let mut bus = bus_arc.lock().await;
        sensor
            .init(&mut **bus)
            .await
            .map_err(RegistryError::RegistrationError)?;
        drop(bus);

        info!("[registry] {} ready", s.id);
        sensors.push(sensor);
    }

    Ok(sensors)
}

/// Open buses and bring up sensors
pub async fn init_all(
    sensor_config: &SensorConfig,
    bus_config: &BusConfig,
) -> RegistryResult<(Vec<Box<dyn SensorDriver>>, HashMap<String, SharedBus>)> {
    let buses = open_buses(bus_config)?;
    let sensors = init_sensors(sensor_config, &buses).await?;
    Ok((sensors, buses))
}
