//! The fixed outbound handshake payload
//!
//! After the interface opens, the device expects a single JSON blob on the
//! OUT endpoint before it starts emitting messages on the IN endpoint. The
//! wire form is fixed at compile time; the typed form exists so the payload
//! stays in sync with the shape the firmware parses.

use serde::{Deserialize, Serialize};

/// Wire form of the handshake, byte for byte.
///
/// Exactly these bytes go to the OUT endpoint. No terminator is appended.
pub const HANDSHAKE_JSON: &str =
    r#"{"message_type":1,"device_type":1,"rnr_id":1,"data":{"options":{}}}"#;

/// The handshake bytes written to the OUT endpoint.
pub fn payload() -> &'static [u8] {
    HANDSHAKE_JSON.as_bytes()
}

/// Handshake message sent to the device after the interface opens.
///
/// Field order matters: the serialized form must match [`HANDSHAKE_JSON`]
/// byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    /// Message discriminator; 1 for the initial handshake.
    pub message_type: u32,
    /// Kind of device the host claims to be.
    pub device_type: u32,
    /// Request-and-response exchange identifier.
    pub rnr_id: u32,
    /// Option block for future protocol revisions.
    pub data: HandshakeData,
}

/// Payload body of the handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeData {
    /// Reserved options, empty in the current protocol revision.
    pub options: HandshakeOptions,
}

/// Reserved option block. Serializes as an empty JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeOptions {}

impl Default for Handshake {
    fn default() -> Self {
        Self {
            message_type: 1,
            device_type: 1,
            rnr_id: 1,
            data: HandshakeData::default(),
        }
    }
}
