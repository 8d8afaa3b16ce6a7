use crate::bus::transport::{BusCondition, Transport};
use crate::errors::{TransportError, TransportResult};
use async_trait::async_trait;
#[cfg(target_os = "linux")]
use i2cdev::core::{I2CDevice, I2CMessage, I2CTransfer};
#[cfg(target_os = "linux")]
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError, LinuxI2CMessage};
#[cfg(target_os = "linux")]
use tracing::trace;

/// I2C bus error type - platform specific
#[cfg(target_os = "linux")]
pub type I2CError = LinuxI2CError;

#[cfg(not(target_os = "linux"))]
#[derive(Debug)]
pub struct I2CError(String);

#[cfg(not(target_os = "linux"))]
impl std::fmt::Display for I2CError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I2C not supported on this platform: {}", self.0)
    }
}

#[cfg(not(target_os = "linux"))]
impl std::error::Error for I2CError {}

/// I2C bus backed by a Linux i2c-dev character device
///
/// i2c-dev cannot hold the bus open between syscalls, so a `send` that asks
/// for a repeated start is buffered and issued together with the following
/// `recv` as one combined I2C_RDWR transfer.
#[cfg(target_os = "linux")]
pub struct I2CBus {
    device: LinuxI2CDevice,
    path: String,
    address: Option<u8>,
    pending: Option<(u8, Vec<u8>)>,
}

#[cfg(not(target_os = "linux"))]
pub struct I2CBus {
    _phantom: std::marker::PhantomData<()>,
}

#[cfg(target_os = "linux")]
impl I2CBus {
    pub fn new(path: &str) -> Result<Self, I2CError> {
        let device = LinuxI2CDevice::new(path, 0)?;
        Ok(Self {
            device,
            path: path.to_string(),
            address: None,
            pending: None,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn select(&mut self, address: u8) -> Result<(), I2CError> {
        if self.address != Some(address) {
            self.device.set_slave_address(address as u16)?;
            self.address = Some(address);
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
#[async_trait]
impl Transport for I2CBus {
    async fn send(&mut self, address: u8, payload: &[u8], condition: BusCondition) -> TransportResult<usize> {
        if self.pending.is_some() {
            return Err(TransportError::Unsupported("two consecutive write phases"));
        }
        self.select(address)?;

        match condition {
            BusCondition::RepeatedStart => {
                trace!("[i2c] {} holding {} byte(s) for {:#04x}", self.path, payload.len(), address);
                self.pending = Some((address, payload.to_vec()));
            }
            BusCondition::Stop => {
                self.device.write(payload)?;
            }
        }
        Ok(payload.len())
    }

    async fn recv(&mut self, address: u8, buf: &mut [u8], condition: BusCondition) -> TransportResult<usize> {
        if condition == BusCondition::RepeatedStart {
            self.pending = None;
            return Err(TransportError::Unsupported("read phase without stop"));
        }

        let Some((pending_address, write)) = self.pending.take() else {
            self.select(address)?;
            self.device.read(buf)?;
            return Ok(buf.len());
        };

        if pending_address != address {
            return Err(TransportError::Fault(format!(
                "read from {:#04x} continues a write to {:#04x}",
                address, pending_address
            )));
        }

        self.select(address)?;
        let requested = buf.len();
        let mut msgs = [LinuxI2CMessage::write(&write), LinuxI2CMessage::read(buf)];
        let completed = self.device.transfer(&mut msgs)?;
        trace!("[i2c] {} combined transfer completed {} of 2 message(s)", self.path, completed);

        // The kernel reports completed messages, not bytes; a missing read
        // message means nothing usable was received.
        if completed == 2 {
            Ok(requested)
        } else {
            Ok(0)
        }
    }
}

#[cfg(not(target_os = "linux"))]
impl I2CBus {
    pub fn new(_path: &str) -> Result<Self, I2CError> {
        Err(I2CError("I2C is only supported on Linux".to_string()))
    }

    pub fn path(&self) -> &str {
        ""
    }
}

#[cfg(not(target_os = "linux"))]
#[async_trait]
impl Transport for I2CBus {
    async fn send(&mut self, _address: u8, _payload: &[u8], _condition: BusCondition) -> TransportResult<usize> {
        Err(I2CError("I2C is only supported on Linux".to_string()).into())
    }

    async fn recv(&mut self, _address: u8, _buf: &mut [u8], _condition: BusCondition) -> TransportResult<usize> {
        Err(I2CError("I2C is only supported on Linux".to_string()).into())
    }
}
