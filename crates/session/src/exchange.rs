//! Request/response exchange
//!
//! Writes the fixed handshake to the OUT pipe, then performs one blocking
//! read from the IN pipe. Neither failure aborts the session: both outcomes
//! are carried as data and the controller decides continuation.

use crate::buffers::{ReadStatus, TransferBuffer};
use crate::error::SessionError;
use crate::transport::BulkPipe;
use std::time::Duration;
use tracing::{debug, warn};

/// What the exchange produced.
///
/// The inbound buffer travels with the outcome so the polling loop reuses
/// it instead of allocating a fresh one per read.
#[derive(Debug)]
pub struct ExchangeOutcome {
    /// Whether the outbound write went through.
    pub sent: bool,
    /// Status of the single exchange read; `None` when the write failed and
    /// the read was skipped.
    pub response: Option<ReadStatus>,
    /// Inbound buffer, reused by the polling loop.
    pub inbound: TransferBuffer,
}

/// Perform the single request/response exchange.
///
/// The outbound buffer is sized exactly to `payload`; the inbound buffer is
/// allocated at `ceiling`. Only allocation failure escapes as an error.
pub fn exchange<P: BulkPipe>(
    out_pipe: &mut P,
    in_pipe: &mut P,
    payload: &[u8],
    ceiling: usize,
    timeout: Duration,
) -> Result<ExchangeOutcome, SessionError> {
    let outbound = TransferBuffer::outbound(payload)?;

    let sent = match out_pipe.write(outbound.bytes(), timeout) {
        Ok(written) => {
            debug!(
                "handshake write ok: {} of {} bytes",
                written,
                outbound.capacity()
            );
            true
        }
        Err(e) => {
            warn!("handshake write failed: {}", e);
            false
        }
    };

    let mut inbound = TransferBuffer::inbound(ceiling)?;

    // A failed write skips the read; the listening window still follows.
    let response = if sent {
        let status = inbound.read_from(in_pipe, timeout);
        match &status {
            Ok(text) => debug!("handshake response: {} bytes: {}", text.len, text.text),
            Err(e) => warn!("failed to read handshake response: {}", e),
        }
        Some(status)
    } else {
        None
    };

    Ok(ExchangeOutcome {
        sent,
        response,
        inbound,
    })
}
