use crate::bus::transport::SharedBus;
use crate::config::sensor_config::SensorConfig;
use crate::errors::{RegistryError, RegistryResult};
use crate::hub::SampleHub;
use crate::messages::{Header, ImuMessage};
use crate::sensors::SensorDriver;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// Device identifier stamped into every header
pub const HUB_DEVICE_ID: &str = "mpu6050_hub";

/// Consecutive skipped cycles before the sensor is reported as failing
const FAILURE_ALERT_THRESHOLD: u32 = 10;

/// Result of one sampling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Reported,
    Skipped,
}

/// State carried by one sensor's sampling loop between cycles
pub struct SamplingTask {
    sensor: Box<dyn SensorDriver>,
    bus: SharedBus,
    hub: SampleHub,
    period: Duration,
    started: Instant,
    sequence: u64,
}

impl SamplingTask {
    pub fn new(sensor: Box<dyn SensorDriver>, bus: SharedBus, hub: SampleHub, period: Duration) -> Self {
        Self {
            sensor,
            bus,
            hub,
            period,
            started: Instant::now(),
            sequence: 0,
        }
    }

    /// Read, decode and publish once
    ///
    /// The bus stays locked for the whole register transaction. A failed read
    /// publishes nothing; the next cycle simply tries again.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let mut bus_lock = self.bus.lock().await;
        let result = self.sensor.read(&mut **bus_lock).await;
        drop(bus_lock); // Release lock early

        let sensor_id = self.sensor.id();
        match result {
            Ok(sample) => {
                self.sequence += 1;
                let header = Header::new(
                    HUB_DEVICE_ID.to_string(),
                    sensor_id.to_string(),
                    self.sequence,
                    self.started.elapsed().as_nanos() as u64,
                );
                debug!("[{}] sample #{}: {:?}", sensor_id, self.sequence, sample);
                self.hub.publish(ImuMessage::new(header, &sample)).await;
                CycleOutcome::Reported
            }
            Err(e) => {
                warn!("[{}] Sensor read error, skipping cycle: {}", sensor_id, e);
                let failures = self.hub.record_failure(sensor_id, e.to_string()).await;
                if failures == FAILURE_ALERT_THRESHOLD {
                    error!("[{}] {} consecutive cycles failed", sensor_id, failures);
                }
                CycleOutcome::Skipped
            }
        }
    }

    /// Sample forever at the configured period
    pub async fn run(mut self) {
        info!(
            "[{}] Starting sensor task every {} ms",
            self.sensor.id(),
            self.period.as_millis()
        );
        loop {
            self.run_cycle().await;
            sleep(self.period).await;
        }
    }
}

/// Spawn one sampling loop per initialized sensor
pub fn spawn_sensor_tasks(
    sensors: Vec<Box<dyn SensorDriver>>,
    buses: &HashMap<String, SharedBus>,
    hub: &SampleHub,
    sensor_config: &SensorConfig,
) -> RegistryResult<Vec<JoinHandle<()>>> {
    let mut handles = Vec::new();
    for sensor in sensors.into_iter() {
        let bus = buses
            .get(sensor.bus())
            .ok_or_else(|| RegistryError::BusNotFound { bus: sensor.bus().to_string() })?
            .clone();

        let period = sensor_config
            .sensors
            .iter()
            .find(|s| s.id == sensor.id())
            .map(|s| s.period())
            .unwrap_or(Duration::from_millis(crate::config::sensor_config::DEFAULT_PERIOD_MS));

        let task = SamplingTask::new(sensor, bus, hub.clone(), period);
        handles.push(tokio::spawn(task.run()));
    }
    Ok(handles)
}
