//! MPU-6050 register map
//!
//! Only the registers the sampling pipeline relies on are listed.

/// Default 7-bit bus address (AD0 low)
pub const MPU6050_ADDRESS: u8 = 0x68;

/// Device identity register
pub const WHO_AM_I: u8 = 0x75;
/// Power management 1: sleep, reset and clock source bits
pub const PWR_MGMT_1: u8 = 0x6B;
/// First of 14 contiguous output registers: accel (6), temp (2), gyro (6)
pub const ACCEL_XOUT_H: u8 = 0x3B;

/// Expected WHO_AM_I value
pub const WHO_AM_I_VALUE: u8 = 0x68;

/// PWR_MGMT_1 value for normal operation on the internal 8 MHz oscillator
pub const PWR_MGMT_1_WAKE: u8 = 0x00;

/// Length of the accel/temp/gyro burst starting at ACCEL_XOUT_H
pub const SAMPLE_BURST_LEN: usize = 14;
