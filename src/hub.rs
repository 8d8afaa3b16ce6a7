use crate::messages::ImuMessage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Buffered samples per subscriber before the oldest are dropped
const CHANNEL_CAPACITY: usize = 256;

/// Fan-out point between sampling tasks and output sinks
///
/// Samples are broadcast so every sink sees every sample and a slow sink
/// never blocks sampling. The hub also keeps per-sensor counters.
#[derive(Clone)]
pub struct SampleHub {
    tx: broadcast::Sender<ImuMessage>,
    sensor_stats: Arc<RwLock<HashMap<String, SensorStats>>>,
}

#[derive(Clone, Debug, Default)]
struct SensorStats {
    samples_published: u64,
    cycles_skipped: u64,
    consecutive_failures: u32,
    last_sample_time_ns: u64,
    last_error: Option<String>,
}

/// Snapshot of one sensor's counters
#[derive(Clone, Debug, PartialEq)]
pub struct SensorStatus {
    pub sensor_id: String,
    pub is_healthy: bool,
    pub samples_published: u64,
    pub cycles_skipped: u64,
    pub consecutive_failures: u32,
    pub last_sample_time_ns: u64,
    pub last_error: Option<String>,
}

impl SampleHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            sensor_stats: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ImuMessage> {
        self.tx.subscribe()
    }

    /// Publish a sample to every subscribed sink
    pub async fn publish(&self, message: ImuMessage) {
        let sensor_id = message.h.sensor_id.clone();
        let t_utc_ns = message.h.t_utc_ns;

        // No active subscribers is fine
        let _ = self.tx.send(message);

        let mut stats = self.sensor_stats.write().await;
        let entry = stats.entry(sensor_id).or_default();
        entry.samples_published += 1;
        entry.consecutive_failures = 0;
        entry.last_sample_time_ns = t_utc_ns;
    }

    /// Record a skipped cycle, returning the current run of consecutive failures
    pub async fn record_failure(&self, sensor_id: &str, error: String) -> u32 {
        let mut stats = self.sensor_stats.write().await;
        let entry = stats.entry(sensor_id.to_string()).or_default();
        entry.cycles_skipped += 1;
        entry.consecutive_failures += 1;
        entry.last_error = Some(error);
        entry.consecutive_failures
    }

    pub async fn status(&self) -> Vec<SensorStatus> {
        let stats = self.sensor_stats.read().await;
        let mut statuses: Vec<SensorStatus> = stats
            .iter()
            .map(|(sensor_id, stats)| SensorStatus {
                sensor_id: sensor_id.clone(),
                is_healthy: stats.consecutive_failures == 0,
                samples_published: stats.samples_published,
                cycles_skipped: stats.cycles_skipped,
                consecutive_failures: stats.consecutive_failures,
                last_sample_time_ns: stats.last_sample_time_ns,
                last_error: stats.last_error.clone(),
            })
            .collect();
        statuses.sort_by(|a, b| a.sensor_id.cmp(&b.sensor_id));
        statuses
    }
}

impl Default for SampleHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Header;
    use crate::sensors::PhysicalSample;

    fn message(seq: u64) -> ImuMessage {
        ImuMessage::new(
            Header::new("hub".to_string(), "imu0".to_string(), seq, 0),
            &PhysicalSample::default(),
        )
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let hub = SampleHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish(message(1)).await;

        assert_eq!(a.recv().await.unwrap().h.seq, 1);
        assert_eq!(b.recv().await.unwrap().h.seq, 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = SampleHub::new();
        hub.publish(message(1)).await;

        let status = hub.status().await;
        assert_eq!(status[0].samples_published, 1);
    }

    #[tokio::test]
    async fn test_failure_counters_reset_on_success() {
        let hub = SampleHub::new();
        assert_eq!(hub.record_failure("imu0", "nack".to_string()).await, 1);
        assert_eq!(hub.record_failure("imu0", "nack".to_string()).await, 2);

        let status = hub.status().await;
        assert!(!status[0].is_healthy);
        assert_eq!(status[0].last_error.as_deref(), Some("nack"));

        hub.publish(message(1)).await;
        let status = hub.status().await;
        assert!(status[0].is_healthy);
        assert_eq!(status[0].cycles_skipped, 2);
        assert_eq!(status[0].consecutive_failures, 0);
    }
}
