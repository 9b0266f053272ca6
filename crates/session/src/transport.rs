//! Transport seam between the session core and the USB backend
//!
//! The controller only ever talks to these traits. The production
//! implementation wraps rusb in the driver crate; tests use the scripted
//! mock in [`crate::test_utils`].

use crate::error::SessionError;
use protocol::{EndpointAddress, TransferError};
use std::time::Duration;

/// One claimed USB interface exposing bulk endpoints.
///
/// `open` must succeed before `resolve_pipe` is called. `close` tears the
/// claim down and is called at most once, after every resolved pipe has been
/// dropped. The session borrows the interface; the host runtime keeps
/// ownership across the whole attach.
pub trait BulkInterface {
    /// Pipe type handed out by [`BulkInterface::resolve_pipe`].
    type Pipe: BulkPipe;

    /// Open the interface for transfers.
    fn open(&mut self) -> Result<(), SessionError>;

    /// Resolve the bulk endpoint at `address` into an exclusively owned pipe.
    ///
    /// The address is a fixed protocol constant, not a discovered value;
    /// resolution fails with [`SessionError::EndpointNotFound`] when the
    /// interface does not expose it.
    fn resolve_pipe(&mut self, address: EndpointAddress) -> Result<Self::Pipe, SessionError>;

    /// Close the interface.
    fn close(&mut self);
}

/// An exclusively owned bulk pipe. Dropping the pipe releases the endpoint.
pub trait BulkPipe {
    /// Blocking write; returns the number of bytes actually transferred.
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<usize, TransferError>;

    /// Blocking read into `buf`; returns the number of bytes actually
    /// transferred.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransferError>;
}
