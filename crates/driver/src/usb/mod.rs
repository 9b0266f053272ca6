//! rusb backend for the session transport
//!
//! Adapts one opened rusb device to the `session` transport traits:
//! claiming the vendor interface, handing out bulk pipes at fixed
//! addresses, and mapping rusb errors into the protocol taxonomy.

pub mod device;
pub mod interface;

pub use device::{DeviceSummary, list_devices, open_device};
pub use interface::{RusbInterface, RusbPipe, map_rusb_error};
