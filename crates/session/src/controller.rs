//! Session controller
//!
//! Drives one complete session: open, resolve pipes, exchange, poll,
//! release. Strictly linear with no retries and no branching back; every
//! exit path releases exactly what it acquired, and an interface that
//! opened is closed exactly once, after all pipes and buffers are gone.

use crate::buffers::ReadStatus;
use crate::delay::Delay;
use crate::error::SessionError;
use crate::exchange::{ExchangeOutcome, exchange};
use crate::poll::{PollPolicy, poll};
use crate::transport::BulkInterface;
use protocol::{BULK_IN, BULK_OUT, EndpointAddress, handshake};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Session parameters, normally taken from the driver configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// IN endpoint to listen on.
    pub bulk_in: EndpointAddress,
    /// OUT endpoint the handshake goes to.
    pub bulk_out: EndpointAddress,
    /// Per-transfer timeout, writes and reads alike.
    pub timeout: Duration,
    /// Inbound transfer ceiling in bytes.
    pub inbound_ceiling: usize,
    /// Listening window that follows the exchange.
    pub poll: PollPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bulk_in: BULK_IN,
            bulk_out: BULK_OUT,
            timeout: Duration::from_millis(1000),
            inbound_ceiling: crate::buffers::DEFAULT_INBOUND_CEILING,
            poll: PollPolicy::default(),
        }
    }
}

/// Phases of the session state machine, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle,
    Opened,
    EndpointsResolved,
    Exchanged,
    Polled,
    Closed,
}

/// Record of one completed session.
#[derive(Debug)]
pub struct SessionReport {
    /// Overall verdict: the status of the last transfer attempted.
    pub success: bool,
    /// Furthest phase the session completed before teardown began.
    pub reached: Phase,
    /// Fatal setup error, when the session aborted before transferring.
    pub error: Option<SessionError>,
    /// Whether the handshake write went through.
    pub sent: bool,
    /// Status of the exchange read, when one was attempted.
    pub response: Option<ReadStatus>,
    /// Status of the final poll iteration, when polling ran.
    pub last_poll: Option<ReadStatus>,
}

impl SessionReport {
    fn aborted(reached: Phase, error: SessionError) -> Self {
        Self {
            success: false,
            reached,
            error: Some(error),
            sent: false,
            response: None,
            last_poll: None,
        }
    }
}

/// Run one complete session against an already-claimable interface.
///
/// The interface is borrowed for the duration of the call; on return every
/// pipe and buffer has been released and, when `open` succeeded, the
/// interface has been closed exactly once.
pub fn run_session<T: BulkInterface, D: Delay>(
    iface: &mut T,
    config: &SessionConfig,
    delay: &D,
) -> SessionReport {
    info!(
        "session start: IN {}, OUT {}, timeout {} ms",
        config.bulk_in,
        config.bulk_out,
        config.timeout.as_millis()
    );

    if let Err(e) = iface.open() {
        warn!("session aborted before open: {}", e);
        return SessionReport::aborted(Phase::Idle, e);
    }
    debug!("interface opened");

    let report = drive(iface, config, delay);

    // Pipes and buffers dropped inside `drive`; the close always comes last.
    iface.close();
    debug!("interface closed");

    info!(success = report.success, "session complete");
    report
}

/// Everything between open and close. Returning from here drops any pipes
/// and buffers acquired so far, in reverse order, before the caller closes
/// the interface.
fn drive<T: BulkInterface, D: Delay>(
    iface: &mut T,
    config: &SessionConfig,
    delay: &D,
) -> SessionReport {
    // Both endpoints must resolve before any transfer. IN first.
    let mut in_pipe = match iface.resolve_pipe(config.bulk_in) {
        Ok(pipe) => pipe,
        Err(e) => {
            warn!("failed to resolve IN pipe: {}", e);
            return SessionReport::aborted(Phase::Opened, e);
        }
    };
    let mut out_pipe = match iface.resolve_pipe(config.bulk_out) {
        Ok(pipe) => pipe,
        Err(e) => {
            warn!("failed to resolve OUT pipe: {}", e);
            return SessionReport::aborted(Phase::Opened, e);
        }
    };
    debug!("endpoints resolved");

    let ExchangeOutcome {
        sent,
        response,
        mut inbound,
    } = match exchange(
        &mut out_pipe,
        &mut in_pipe,
        handshake::payload(),
        config.inbound_ceiling,
        config.timeout,
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("exchange aborted: {}", e);
            return SessionReport::aborted(Phase::EndpointsResolved, e);
        }
    };
    debug!(sent, "exchange complete");

    // The listening window runs even after a failed exchange.
    let last_poll = poll(
        &mut in_pipe,
        &mut inbound,
        &config.poll,
        config.timeout,
        delay,
    );
    debug!("polling complete");

    // Last transfer status wins: write, then exchange read, then each poll.
    let success = match (&last_poll, &response) {
        (Some(status), _) => status.is_ok(),
        (None, Some(status)) => status.is_ok(),
        (None, None) => sent,
    };

    SessionReport {
        success,
        reached: Phase::Polled,
        error: None,
        sent,
        response,
        last_poll,
    }
}
