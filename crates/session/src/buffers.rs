//! Direction-tagged transfer buffers
//!
//! One outbound buffer sized exactly to the payload and one inbound buffer
//! at the transfer ceiling, reused across every inbound read of the session.
//! The actual transferred length is recorded after each transfer; inbound
//! data beyond the ceiling is silently cut when decoded for the log trail.

use crate::error::SessionError;
use crate::transport::BulkPipe;
use protocol::{Direction, TransferError};
use std::time::Duration;

/// Transfer ceiling used when none is configured.
pub const DEFAULT_INBOUND_CEILING: usize = 512;

/// Outcome of one inbound read.
pub type ReadStatus = Result<InboundText, TransferError>;

/// One decoded inbound read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    /// Bytes actually transferred, before the ceiling cut.
    pub len: usize,
    /// Lossy UTF-8 decode of at most a ceiling's worth of bytes.
    pub text: String,
}

/// A fixed-capacity transfer buffer tagged with its direction.
#[derive(Debug)]
pub struct TransferBuffer {
    direction: Direction,
    data: Vec<u8>,
    actual: usize,
}

impl TransferBuffer {
    /// Outbound buffer holding exactly `payload`: no slack, no terminator.
    pub fn outbound(payload: &[u8]) -> Result<Self, SessionError> {
        let mut data = Vec::new();
        data.try_reserve_exact(payload.len())
            .map_err(|_| SessionError::OutOfResources)?;
        data.extend_from_slice(payload);

        Ok(Self {
            direction: Direction::Out,
            data,
            actual: payload.len(),
        })
    }

    /// Zeroed inbound buffer at the transfer ceiling.
    pub fn inbound(ceiling: usize) -> Result<Self, SessionError> {
        let mut data = Vec::new();
        data.try_reserve_exact(ceiling)
            .map_err(|_| SessionError::OutOfResources)?;
        data.resize(ceiling, 0);

        Ok(Self {
            direction: Direction::In,
            data,
            actual: 0,
        })
    }

    /// Direction this buffer was allocated for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Fixed capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes handed to an outbound transfer.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes actually transferred by the most recent transfer.
    pub fn actual_len(&self) -> usize {
        self.actual
    }

    /// Perform one blocking read from `pipe` into this buffer.
    ///
    /// The buffer is not cleared between reads; only the recorded length
    /// decides what counts as received.
    pub fn read_from<P: BulkPipe>(&mut self, pipe: &mut P, timeout: Duration) -> ReadStatus {
        match pipe.read(&mut self.data, timeout) {
            Ok(len) => {
                self.actual = len;
                Ok(self.decoded())
            }
            Err(e) => Err(e),
        }
    }

    /// The received bytes, cut at the buffer capacity.
    pub fn received(&self) -> &[u8] {
        let cut = self.actual.min(self.data.len());
        &self.data[..cut]
    }

    /// Decode the received bytes for the log trail.
    pub fn decoded(&self) -> InboundText {
        InboundText {
            len: self.actual,
            text: String::from_utf8_lossy(self.received()).into_owned(),
        }
    }
}
