use super::registers::SAMPLE_BURST_LEN;
use serde::{Deserialize, Serialize};

/// Standard gravity, m/s² per g
pub const STANDARD_GRAVITY: f32 = 9.80665;

// Sensitivities for the power-on full-scale ranges
const ACCEL_SENSITIVITY_2G: f32 = 16384.0; // LSB/g
const GYRO_SENSITIVITY_250DPS: f32 = 131.0; // LSB/(°/s)
const TEMP_SENSITIVITY: f32 = 340.0; // LSB/°C
const TEMP_OFFSET: f32 = 36.53; // °C

/// Raw output registers as delivered by one burst read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub temperature: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
}

impl RawSample {
    /// Assemble seven big-endian two's-complement pairs
    pub fn from_be_bytes(buf: &[u8; SAMPLE_BURST_LEN]) -> Self {
        let word = |i: usize| i16::from_be_bytes([buf[i], buf[i + 1]]);
        Self {
            ax: word(0),
            ay: word(2),
            az: word(4),
            temperature: word(6),
            gx: word(8),
            gy: word(10),
            gz: word(12),
        }
    }
}

/// One sample in physical units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalSample {
    /// Linear acceleration (m/s²)
    pub accel: [f32; 3],
    /// Die temperature (°C)
    pub temperature: f32,
    /// Angular rate (°/s)
    pub gyro: [f32; 3],
}

/// Convert a raw sample to physical units
///
/// Pure and total: every raw value maps linearly, nothing is clamped.
pub fn decode(raw: &RawSample) -> PhysicalSample {
    PhysicalSample {
        accel: [accel_m_s2(raw.ax), accel_m_s2(raw.ay), accel_m_s2(raw.az)],
        temperature: temperature_c(raw.temperature),
        gyro: [gyro_dps(raw.gx), gyro_dps(raw.gy), gyro_dps(raw.gz)],
    }
}

fn accel_m_s2(raw: i16) -> f32 {
    raw as f32 / ACCEL_SENSITIVITY_2G * STANDARD_GRAVITY
}

fn temperature_c(raw: i16) -> f32 {
    raw as f32 / TEMP_SENSITIVITY + TEMP_OFFSET
}

fn gyro_dps(raw: i16) -> f32 {
    raw as f32 / GYRO_SENSITIVITY_250DPS
}
