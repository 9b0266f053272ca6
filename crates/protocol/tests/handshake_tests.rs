//! Integration tests for the handshake payload
//!
//! Verifies the wire form the device actually receives: shape, field order,
//! and byte-level invariants.

use protocol::{HANDSHAKE_JSON, Handshake, handshake};
use serde_json::Value;

#[test]
fn test_payload_is_valid_json() {
    let value: Value = serde_json::from_str(HANDSHAKE_JSON).expect("payload must parse");

    assert_eq!(value["message_type"], 1);
    assert_eq!(value["device_type"], 1);
    assert_eq!(value["rnr_id"], 1);
    assert!(value["data"]["options"].as_object().unwrap().is_empty());
}

#[test]
fn test_payload_field_order_is_fixed() {
    // The device-side parser is order-sensitive; keys must appear exactly
    // as the firmware expects them.
    let message_type = HANDSHAKE_JSON.find("message_type").unwrap();
    let device_type = HANDSHAKE_JSON.find("device_type").unwrap();
    let rnr_id = HANDSHAKE_JSON.find("rnr_id").unwrap();
    let data = HANDSHAKE_JSON.find("data").unwrap();

    assert!(message_type < device_type);
    assert!(device_type < rnr_id);
    assert!(rnr_id < data);
}

#[test]
fn test_typed_roundtrip_preserves_bytes() {
    let typed: Handshake = serde_json::from_str(HANDSHAKE_JSON).unwrap();
    let reserialized = serde_json::to_string(&typed).unwrap();
    assert_eq!(reserialized.as_bytes(), handshake::payload());
}

#[test]
fn test_payload_fits_inbound_ceiling() {
    // An echoing device must be able to return the full handshake within
    // one 512 byte read.
    assert!(handshake::payload().len() <= 512);
}
