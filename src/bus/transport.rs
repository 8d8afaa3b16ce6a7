//! Byte-level bus contract used by register transactions.
//!
//! A transport moves raw bytes to and from a 7-bit device address. Each call
//! ends with a [`BusCondition`]: `Stop` releases the bus, `RepeatedStart`
//! keeps it so the next phase follows without another caller slipping in.
//! Register reads are built from a `send` with `RepeatedStart` followed by a
//! `recv` with `Stop`.

use crate::errors::TransportResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Condition placed on the bus after a transfer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusCondition {
    /// Release the bus after this phase
    Stop,
    /// Keep the bus and continue with another phase
    RepeatedStart,
}

/// Two-primitive bus abstraction
///
/// Implementations return the number of bytes actually transferred. A count
/// lower than requested is not an error at this layer; callers decide what a
/// short transfer means.
///
/// Transports are not reentrant. Hold the bus exclusively (see [`SharedBus`])
/// for the full duration of a multi-phase transaction.
#[async_trait]
pub trait Transport: Send {
    /// Write `payload` to `address`, returning the number of bytes acknowledged
    async fn send(&mut self, address: u8, payload: &[u8], condition: BusCondition) -> TransportResult<usize>;

    /// Read into `buf` from `address`, returning the number of bytes received
    async fn recv(&mut self, address: u8, buf: &mut [u8], condition: BusCondition) -> TransportResult<usize>;
}

/// A transport shared between sampling tasks
pub type SharedBus = Arc<Mutex<Box<dyn Transport>>>;

/// Wrap a transport for shared use
pub fn shared(transport: Box<dyn Transport>) -> SharedBus {
    Arc::new(Mutex::new(transport))
}
