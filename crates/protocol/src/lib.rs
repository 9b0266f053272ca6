//! Protocol library for rnr-usb
//!
//! This crate defines the wire-level vocabulary shared by the session core and
//! the driver backend: the fixed JSON handshake payload, bulk endpoint
//! addressing, and the transfer error taxonomy. It performs no I/O.
//!
//! # Example
//!
//! ```
//! use protocol::{handshake, BULK_IN, BULK_OUT};
//!
//! // The handshake bytes written to the OUT endpoint.
//! let payload = handshake::payload();
//! assert!(!payload.is_empty());
//!
//! // Direction is encoded in bit 7 of the endpoint address.
//! assert!(BULK_IN.is_in());
//! assert!(!BULK_OUT.is_in());
//! ```

pub mod error;
pub mod handshake;
pub mod types;

pub use error::TransferError;
pub use handshake::{HANDSHAKE_JSON, Handshake};
pub use types::{BULK_IN, BULK_OUT, Direction, EndpointAddress};
