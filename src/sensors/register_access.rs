use crate::bus::transport::{BusCondition, Transport};
use crate::errors::{SensorError, SensorResult, TransportError, TransportResult};
use tracing::trace;

/// Register-level transactions against one device on a borrowed bus
///
/// Writes are a single `[reg, value]` phase ending in stop. Reads send the
/// register address with a repeated start and then read with stop, so no
/// other transaction can land between the two phases.
pub struct RegisterAccess<'a, T: Transport + ?Sized> {
    bus: &'a mut T,
    address: u8,
}

impl<'a, T: Transport + ?Sized> RegisterAccess<'a, T> {
    pub fn new(bus: &'a mut T, address: u8) -> Self {
        Self { bus, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Write one register; both bytes must be acknowledged
    pub async fn write_register(&mut self, reg: u8, value: u8) -> TransportResult<()> {
        trace!("[regs] write {:#04x} <- {:#04x} @ {:#04x}", reg, value, self.address);
        let payload = [reg, value];
        let acked = self.bus.send(self.address, &payload, BusCondition::Stop).await?;
        if acked != payload.len() {
            return Err(TransportError::PartialAck {
                address: self.address,
                expected: payload.len(),
                acknowledged: acked,
            });
        }
        Ok(())
    }

    /// Read one register
    pub async fn read_register(&mut self, reg: u8) -> TransportResult<u8> {
        self.select(reg).await?;

        let mut buf = [0u8; 1];
        let received = self.bus.recv(self.address, &mut buf, BusCondition::Stop).await?;
        if received != buf.len() {
            return Err(TransportError::Fault(format!(
                "no data returned for register {:#04x} @ {:#04x}",
                reg, self.address
            )));
        }
        trace!("[regs] read {:#04x} -> {:#04x} @ {:#04x}", reg, buf[0], self.address);
        Ok(buf[0])
    }

    /// Read `length` contiguous registers starting at `reg`
    ///
    /// A short transfer is reported as [`SensorError::IncompleteTransfer`];
    /// a partial buffer is never returned.
    pub async fn read_burst(&mut self, reg: u8, length: usize) -> SensorResult<Vec<u8>> {
        self.select(reg).await?;

        let mut buf = vec![0u8; length];
        let received = self.bus.recv(self.address, &mut buf, BusCondition::Stop).await?;
        if received < length {
            return Err(SensorError::IncompleteTransfer {
                register: reg,
                expected: length,
                received,
            });
        }
        trace!("[regs] burst {:#04x} x{} @ {:#04x}", reg, length, self.address);
        Ok(buf)
    }

    /// Address phase of a read: register byte, bus kept for the data phase
    async fn select(&mut self, reg: u8) -> TransportResult<()> {
        let acked = self.bus.send(self.address, &[reg], BusCondition::RepeatedStart).await?;
        if acked != 1 {
            return Err(TransportError::PartialAck {
                address: self.address,
                expected: 1,
                acknowledged: acked,
            });
        }
        Ok(())
    }
}
