use crate::bus::serial::SerialBus;
use crate::config::output_config::{OutputEntry, DEFAULT_SERIAL_BAUD};
use crate::errors::{OutputError, OutputResult};
use crate::hub::SampleHub;
use crate::messages::ImuMessage;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[cfg(feature = "mavlink_telemetry")]
use crate::bus::mavlink::MavlinkLink;

/// Destination for published samples
#[async_trait]
pub trait SampleSink: Send {
    fn name(&self) -> &str;
    async fn publish(&mut self, message: &ImuMessage) -> OutputResult<()>;
}

/// Writes the three report lines of every sample
pub struct TextSink<W> {
    name: String,
    writer: W,
    line_ending: &'static str,
}

impl<W: AsyncWrite + Unpin + Send> TextSink<W> {
    pub fn new(name: String, writer: W, line_ending: &'static str) -> Self {
        Self { name, writer, line_ending }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> SampleSink for TextSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, message: &ImuMessage) -> OutputResult<()> {
        let mut text = String::new();
        for line in message.report_lines() {
            text.push_str(&line);
            text.push_str(self.line_ending);
        }
        write_all(&self.name, &mut self.writer, text.as_bytes()).await
    }
}

/// Writes one JSON object per line
pub struct JsonSink<W> {
    name: String,
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> JsonSink<W> {
    pub fn new(name: String, writer: W) -> Self {
        Self { name, writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> SampleSink for JsonSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, message: &ImuMessage) -> OutputResult<()> {
        let mut line = message.to_json()?;
        line.push('\n');
        write_all(&self.name, &mut self.writer, line.as_bytes()).await
    }
}

async fn write_all<W: AsyncWrite + Unpin>(sink: &str, writer: &mut W, bytes: &[u8]) -> OutputResult<()> {
    let io = |source| OutputError::Io { sink: sink.to_string(), source };
    writer.write_all(bytes).await.map_err(io)?;
    writer.flush().await.map_err(io)
}

/// SCALED_IMU telemetry
#[cfg(feature = "mavlink_telemetry")]
pub struct MavlinkSink {
    name: String,
    link: MavlinkLink,
}

#[cfg(feature = "mavlink_telemetry")]
#[async_trait]
impl SampleSink for MavlinkSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, message: &ImuMessage) -> OutputResult<()> {
        self.link
            .send_imu(message)
            .await
            .map(|_| ())
            .map_err(|e| OutputError::Mavlink(e.to_string()))
    }
}

/// Open the sink described by one `[[output]]` entry
pub fn open_sink(entry: &OutputEntry) -> OutputResult<Box<dyn SampleSink>> {
    match entry {
        OutputEntry::Console => Ok(Box::new(TextSink::new(
            "console".to_string(),
            tokio::io::stdout(),
            "\n",
        ))),
        OutputEntry::Json => Ok(Box::new(JsonSink::new("json".to_string(), tokio::io::stdout()))),
        OutputEntry::Serial { path, baud } => {
            let serial = open_serial(path, baud.unwrap_or(DEFAULT_SERIAL_BAUD))?;
            Ok(Box::new(TextSink::new(
                format!("serial:{}", path),
                serial.into_stream(),
                "\r\n",
            )))
        }
        #[cfg(feature = "mavlink_telemetry")]
        OutputEntry::Mavlink { path, baud, system_id, component_id } => {
            let serial = open_serial(path, baud.unwrap_or(DEFAULT_SERIAL_BAUD))?;
            // MAV_COMP_ID_IMU
            let link = MavlinkLink::new(serial, system_id.unwrap_or(1), component_id.unwrap_or(200));
            Ok(Box::new(MavlinkSink {
                name: format!("mavlink:{}", path),
                link,
            }))
        }
        #[cfg(not(feature = "mavlink_telemetry"))]
        OutputEntry::Mavlink { .. } => Err(OutputError::Mavlink(
            "built without the mavlink_telemetry feature".to_string(),
        )),
    }
}

fn open_serial(path: &str, baud: u32) -> OutputResult<SerialBus> {
    SerialBus::new_with_baud(path, baud).map_err(|source| OutputError::Io {
        sink: format!("serial:{}", path),
        source,
    })
}

/// Drive each sink from its own hub subscription
///
/// A failing sink logs and keeps consuming; a lagging sink skips the samples
/// it missed. Tasks end when the hub is dropped.
pub fn spawn_output_tasks(hub: &SampleHub, sinks: Vec<Box<dyn SampleSink>>) -> Vec<JoinHandle<()>> {
    sinks
        .into_iter()
        .map(|mut sink| {
            let mut rx = hub.subscribe();
            tokio::spawn(async move {
                info!("[output] {} attached", sink.name());
                loop {
                    match rx.recv().await {
                        Ok(message) => {
                            if let Err(e) = sink.publish(&message).await {
                                error!("[output] {} failed for {}: {}", sink.name(), message.sensor_id(), e);
                            } else {
                                debug!("[output] {} <- {} #{}", sink.name(), message.sensor_id(), message.h.seq);
                            }
                        }
                        Err(RecvError::Lagged(missed)) => {
                            warn!("[output] {} lagging, dropped {} sample(s)", sink.name(), missed);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                info!("[output] {} detached", sink.name());
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Header;
    use crate::sensors::PhysicalSample;

    fn message() -> ImuMessage {
        let sample = PhysicalSample {
            accel: [9.80665, 0.0, -9.80665],
            temperature: 36.53,
            gyro: [0.0, 1.0, -1.0 / 131.0],
        };
        ImuMessage::new(Header::new("hub".into(), "imu0".into(), 3, 0), &sample)
    }

    #[tokio::test]
    async fn test_text_sink_writes_three_lines() {
        let mut sink = TextSink::new("uart".to_string(), Vec::new(), "\r\n");
        sink.publish(&message()).await.unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "Ax: 9.81 m/s², Ay: 0.00 m/s², Az: -9.81 m/s²\r\n\
             Tp: 36.53 °C\r\n\
             Gx: 0.00 °/s, Gy: 1.00 °/s, Gz: -0.01 °/s\r\n"
        );
    }

    #[tokio::test]
    async fn test_json_sink_writes_one_line_per_sample() {
        let mut sink = JsonSink::new("json".to_string(), Vec::new());
        sink.publish(&message()).await.unwrap();
        sink.publish(&message()).await.unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let decoded: ImuMessage = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(decoded.h.seq, 3);
    }

    struct FailingSink;

    #[async_trait]
    impl SampleSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn publish(&mut self, _message: &ImuMessage) -> OutputResult<()> {
            Err(OutputError::Mavlink("link down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_output_tasks_stop_when_hub_is_dropped() {
        let hub = SampleHub::new();
        let handles = spawn_output_tasks(&hub, vec![Box::new(FailingSink)]);

        hub.publish(message()).await;
        drop(hub);

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
