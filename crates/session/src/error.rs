//! Session error taxonomy
//!
//! Setup failures are fatal to the session and surface here. Transfer
//! failures during the exchange and polling phases are carried as data
//! ([`crate::buffers::ReadStatus`]) and never reach this enum.

use protocol::{EndpointAddress, TransferError};
use thiserror::Error;

/// Fatal session setup error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The handle does not expose the expected USB interface.
    #[error("handle does not expose the expected interface: {reason}")]
    InterfaceUnavailable { reason: String },

    /// Opening the claimed interface failed.
    #[error("failed to open interface: {source}")]
    OpenFailed {
        #[source]
        source: TransferError,
    },

    /// The fixed endpoint address is not present on the interface.
    #[error("bulk endpoint {address} not found")]
    EndpointNotFound { address: EndpointAddress },

    /// A transfer buffer could not be allocated.
    #[error("out of resources allocating a transfer buffer")]
    OutOfResources,
}
