//! Bounded listening window
//!
//! After the handshake the device may emit asynchronous messages on the IN
//! endpoint. The loop performs a fixed number of blocking reads on the
//! reused inbound buffer with a fixed delay after every read, surfacing each
//! outcome independently. A failed read never ends the window early; there
//! is no backoff and no success-streak termination, so the total wall-clock
//! duration stays bounded by `iterations * (timeout + interval)`.

use crate::buffers::{ReadStatus, TransferBuffer};
use crate::delay::Delay;
use crate::transport::BulkPipe;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed-count, fixed-interval polling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of read attempts.
    pub iterations: u32,
    /// Delay after every read, the final one included.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            iterations: 10,
            interval: Duration::from_millis(100),
        }
    }
}

/// Run the polling loop; returns the final iteration's status, or `None`
/// when the policy asks for zero iterations.
pub fn poll<P: BulkPipe, D: Delay>(
    in_pipe: &mut P,
    buffer: &mut TransferBuffer,
    policy: &PollPolicy,
    timeout: Duration,
    delay: &D,
) -> Option<ReadStatus> {
    let mut last = None;

    for iteration in 1..=policy.iterations {
        let status = buffer.read_from(in_pipe, timeout);
        match &status {
            Ok(text) => debug!(
                "poll {}/{}: {} bytes: {}",
                iteration, policy.iterations, text.len, text.text
            ),
            Err(e) => warn!("poll {}/{}: read failed: {}", iteration, policy.iterations, e),
        }
        last = Some(status);

        delay.sleep(policy.interval);
    }

    last
}
