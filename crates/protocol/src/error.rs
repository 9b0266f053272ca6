//! Transfer error taxonomy
//!
//! Maps to libusb error codes. The driver backend converts `rusb::Error`
//! into this taxonomy so the session core stays transport-agnostic.

use thiserror::Error;

/// Error reported by a single bulk transfer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// Transfer timed out
    #[error("transfer timed out")]
    Timeout,
    /// Endpoint stalled (protocol error)
    #[error("endpoint stalled")]
    Pipe,
    /// Device was disconnected
    #[error("device disconnected")]
    NoDevice,
    /// Device or endpoint not found
    #[error("device or endpoint not found")]
    NotFound,
    /// Device is busy
    #[error("device busy")]
    Busy,
    /// Buffer overflow
    #[error("buffer overflow")]
    Overflow,
    /// I/O error
    #[error("I/O error")]
    Io,
    /// Invalid parameter
    #[error("invalid parameter")]
    InvalidParam,
    /// Access denied (permissions)
    #[error("access denied")]
    Access,
    /// Other error with message
    #[error("{message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_equality() {
        assert_eq!(TransferError::Timeout, TransferError::Timeout);
        assert_ne!(TransferError::Timeout, TransferError::NoDevice);
    }

    #[test]
    fn test_transfer_error_display() {
        assert_eq!(TransferError::Timeout.to_string(), "transfer timed out");
        let other = TransferError::Other {
            message: "libusb: unknown".to_string(),
        };
        assert_eq!(other.to_string(), "libusb: unknown");
    }
}
