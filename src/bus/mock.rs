//! Mock transport for testing
//!
//! Records every bus phase and replays scripted read data, so register
//! framing can be verified without hardware.

use crate::bus::transport::{BusCondition, Transport};
use crate::errors::{TransportError, TransportResult};
use async_trait::async_trait;
use std::collections::VecDeque;

/// One recorded bus phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Send {
        address: u8,
        payload: Vec<u8>,
        condition: BusCondition,
    },
    Recv {
        address: u8,
        len: usize,
        condition: BusCondition,
    },
}

/// Mock transport
///
/// Each `recv` consumes the next queued response. A response shorter than
/// the requested length produces a short read; with nothing queued the read
/// returns zero bytes.
#[derive(Debug, Default)]
pub struct MockTransport {
    transactions: Vec<Transaction>,
    responses: VecDeque<Vec<u8>>,
    send_fault: Option<String>,
    recv_fault: Option<String>,
    ack_limit: Option<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes returned by the next unanswered `recv`
    pub fn push_read(&mut self, data: &[u8]) {
        self.responses.push_back(data.to_vec());
    }

    /// Make the next `send` fail outright
    pub fn fail_next_send(&mut self, reason: &str) {
        self.send_fault = Some(reason.to_string());
    }

    /// Make the next `recv` fail outright
    pub fn fail_next_recv(&mut self, reason: &str) {
        self.recv_fault = Some(reason.to_string());
    }

    /// Acknowledge at most `count` bytes of the next `send`
    pub fn limit_next_ack(&mut self, count: usize) {
        self.ack_limit = Some(count);
    }

    /// Get transaction log (for test verification)
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, address: u8, payload: &[u8], condition: BusCondition) -> TransportResult<usize> {
        self.transactions.push(Transaction::Send {
            address,
            payload: payload.to_vec(),
            condition,
        });

        if let Some(reason) = self.send_fault.take() {
            return Err(TransportError::Fault(reason));
        }
        let acked = match self.ack_limit.take() {
            Some(limit) => limit.min(payload.len()),
            None => payload.len(),
        };
        Ok(acked)
    }

    async fn recv(&mut self, address: u8, buf: &mut [u8], condition: BusCondition) -> TransportResult<usize> {
        self.transactions.push(Transaction::Recv {
            address,
            len: buf.len(),
            condition,
        });

        if let Some(reason) = self.recv_fault.take() {
            return Err(TransportError::Fault(reason));
        }
        let data = self.responses.pop_front().unwrap_or_default();
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }
}
