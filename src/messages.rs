use crate::sensors::PhysicalSample;
use serde::{Deserialize, Serialize};

/// Header metadata attached to every published sample
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Header {
    /// Unique device identifier
    pub device_id: String,
    /// Sensor identifier from the configuration (e.g., "imu0")
    pub sensor_id: String,
    /// Per-sensor sequence number, counting published samples
    pub seq: u64,
    /// UTC timestamp in nanoseconds
    pub t_utc_ns: u64,
    /// Nanoseconds since the hub started
    pub t_mono_ns: u64,
    /// Message schema version for evolution
    pub schema_v: u16,
}

impl Header {
    /// Create a new header stamped with the current UTC time
    pub fn new(device_id: String, sensor_id: String, seq: u64, t_mono_ns: u64) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let now_utc = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        Self {
            device_id,
            sensor_id,
            seq,
            t_utc_ns: now_utc,
            t_mono_ns,
            schema_v: 1,
        }
    }
}

/// Accelerometer, temperature and gyroscope reading of one cycle
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImuMessage {
    pub h: Header,
    /// Acceleration X-axis (m/s²)
    pub ax: f32,
    /// Acceleration Y-axis (m/s²)
    pub ay: f32,
    /// Acceleration Z-axis (m/s²)
    pub az: f32,
    /// Die temperature (°C)
    pub temp: f32,
    /// Angular rate X-axis (°/s)
    pub gx: f32,
    /// Angular rate Y-axis (°/s)
    pub gy: f32,
    /// Angular rate Z-axis (°/s)
    pub gz: f32,
}

impl ImuMessage {
    pub fn new(h: Header, sample: &PhysicalSample) -> Self {
        Self {
            h,
            ax: sample.accel[0],
            ay: sample.accel[1],
            az: sample.accel[2],
            temp: sample.temperature,
            gx: sample.gyro[0],
            gy: sample.gyro[1],
            gz: sample.gyro[2],
        }
    }

    pub fn sensor_id(&self) -> &str {
        &self.h.sensor_id
    }

    /// One line per quantity group: acceleration, temperature, angular rate
    pub fn report_lines(&self) -> [String; 3] {
        [
            format!(
                "Ax: {:.2} m/s², Ay: {:.2} m/s², Az: {:.2} m/s²",
                self.ax, self.ay, self.az
            ),
            format!("Tp: {:.2} °C", self.temp),
            format!(
                "Gx: {:.2} °/s, Gy: {:.2} °/s, Gz: {:.2} °/s",
                self.gx, self.gy, self.gz
            ),
        ]
    }

    /// Serialize to a single-line JSON object
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_message() -> ImuMessage {
        let sample = PhysicalSample {
            accel: [9.80665, 0.0, -9.80665],
            temperature: 36.53,
            gyro: [0.0, 1.0, -1.0 / 131.0],
        };
        ImuMessage::new(Header::new("hub".to_string(), "imu0".to_string(), 7, 0), &sample)
    }

    #[test]
    fn test_header_creation() {
        let header = Header::new("test_device".to_string(), "imu0".to_string(), 42, 5);

        assert_eq!(header.device_id, "test_device");
        assert_eq!(header.sensor_id, "imu0");
        assert_eq!(header.seq, 42);
        assert_eq!(header.t_mono_ns, 5);
        assert_eq!(header.schema_v, 1);
        assert!(header.t_utc_ns > 0);
    }

    #[test]
    fn test_report_lines() {
        let lines = scenario_message().report_lines();

        assert_eq!(lines[0], "Ax: 9.81 m/s², Ay: 0.00 m/s², Az: -9.81 m/s²");
        assert_eq!(lines[1], "Tp: 36.53 °C");
        assert_eq!(lines[2], "Gx: 0.00 °/s, Gy: 1.00 °/s, Gz: -0.01 °/s");
    }

    #[test]
    fn test_small_negative_values_keep_sign() {
        let mut msg = scenario_message();
        msg.ax = -0.5;
        assert!(msg.report_lines()[0].starts_with("Ax: -0.50 m/s²"));
    }

    #[test]
    fn test_json_serialization() {
        let msg = scenario_message();
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"sensor_id\":\"imu0\""));
        assert!(!json.contains('\n'));

        let decoded: ImuMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, msg);
    }
}
