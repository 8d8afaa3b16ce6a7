use super::serial::SerialBus;
use crate::messages::ImuMessage;
use crate::sensors::decoder::STANDARD_GRAVITY;
use mavlink::common::{MavMessage, SCALED_IMU_DATA};
use mavlink::{MavHeader, MavlinkVersion};
use tokio_serial::SerialStream;
use tracing::trace;

/// Outgoing MAVLink telemetry link over a serial port
pub struct MavlinkLink {
    stream: SerialStream,
    path: String,
    system_id: u8,
    component_id: u8,
    sequence: u8,
    started: std::time::Instant,
}

impl MavlinkLink {
    pub fn new(serial: SerialBus, system_id: u8, component_id: u8) -> Self {
        let path = serial.path().to_string();
        Self {
            stream: serial.into_stream(),
            path,
            system_id,
            component_id,
            sequence: 0,
            started: std::time::Instant::now(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Send one sample as SCALED_IMU (MAVLink v2)
    pub async fn send_imu(&mut self, msg: &ImuMessage) -> Result<usize, mavlink::error::MessageWriteError> {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        let header = MavHeader {
            system_id: self.system_id,
            component_id: self.component_id,
            sequence,
        };

        let time_boot_ms = self.started.elapsed().as_millis() as u32;
        let data = MavMessage::SCALED_IMU(to_scaled_imu(msg, time_boot_ms));
        let written =
            mavlink::write_versioned_msg_async(&mut self.stream, MavlinkVersion::V2, header, &data).await?;
        trace!("[MAVLink] {} wrote SCALED_IMU seq={} ({} bytes)", self.path, sequence, written);
        Ok(written)
    }
}

/// Convert to SCALED_IMU units: milli-g and milli-rad/s
///
/// Temperature is not carried; SCALED_IMU is filled from accel and gyro only.
pub fn to_scaled_imu(msg: &ImuMessage, time_boot_ms: u32) -> SCALED_IMU_DATA {
    let milli_g = |a: f32| (a / STANDARD_GRAVITY * 1000.0).round() as i16;
    let milli_rad = |g: f32| (g.to_radians() * 1000.0).round() as i16;

    SCALED_IMU_DATA {
        time_boot_ms,
        xacc: milli_g(msg.ax),
        yacc: milli_g(msg.ay),
        zacc: milli_g(msg.az),
        xgyro: milli_rad(msg.gx),
        ygyro: milli_rad(msg.gy),
        zgyro: milli_rad(msg.gz),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Header;
    use crate::sensors::PhysicalSample;

    #[test]
    fn test_scaled_imu_units() {
        let sample = PhysicalSample {
            accel: [9.80665, 0.0, -9.80665],
            temperature: 36.53,
            gyro: [0.0, 57.29578, -1.0],
        };
        let msg = ImuMessage::new(Header::new("hub".into(), "imu0".into(), 1, 0), &sample);

        let imu = to_scaled_imu(&msg, 1234);
        assert_eq!(imu.time_boot_ms, 1234);
        assert_eq!(imu.xacc, 1000);
        assert_eq!(imu.yacc, 0);
        assert_eq!(imu.zacc, -1000);
        assert_eq!(imu.ygyro, 1000);
        assert_eq!(imu.zgyro, -17);
    }

    #[test]
    fn test_scaled_imu_saturates_out_of_range() {
        let sample = PhysicalSample {
            gyro: [-250.0 * 131.0, 0.0, 0.0],
            ..Default::default()
        };
        let msg = ImuMessage::new(Header::new("hub".into(), "imu0".into(), 1, 0), &sample);
        assert_eq!(to_scaled_imu(&msg, 0).xgyro, i16::MIN);
    }
}
