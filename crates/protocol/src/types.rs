//! Bulk endpoint addressing
//!
//! The target device exposes exactly two bulk endpoints at fixed addresses.
//! The addresses are explicit configuration values rather than values
//! discovered from descriptors, so simulated endpoints can substitute their
//! own in tests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transfer direction, from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Device to host.
    In,
    /// Host to device.
    Out,
}

/// A USB endpoint address, direction bit included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointAddress(pub u8);

/// Default IN endpoint (device to host).
pub const BULK_IN: EndpointAddress = EndpointAddress(0x81);

/// Default OUT endpoint (host to device).
pub const BULK_OUT: EndpointAddress = EndpointAddress(0x01);

impl EndpointAddress {
    /// Direction encoded in bit 7 of the address.
    pub fn direction(self) -> Direction {
        if self.0 & 0x80 != 0 {
            Direction::In
        } else {
            Direction::Out
        }
    }

    /// Whether this is an IN (device to host) endpoint.
    pub fn is_in(self) -> bool {
        self.direction() == Direction::In
    }

    /// Endpoint number without the direction bit.
    pub fn number(self) -> u8 {
        self.0 & 0x0f
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_direction() {
        // Bit 7 = 1 means IN endpoint
        assert_eq!(BULK_IN.direction(), Direction::In);
        assert!(BULK_IN.is_in());

        // Bit 7 = 0 means OUT endpoint
        assert_eq!(BULK_OUT.direction(), Direction::Out);
        assert!(!BULK_OUT.is_in());
    }

    #[test]
    fn test_endpoint_number_strips_direction() {
        assert_eq!(BULK_IN.number(), 1);
        assert_eq!(BULK_OUT.number(), 1);
        assert_eq!(EndpointAddress(0x82).number(), 2);
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(BULK_IN.to_string(), "0x81");
        assert_eq!(BULK_OUT.to_string(), "0x01");
    }
}
