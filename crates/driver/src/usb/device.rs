//! Device lookup
//!
//! Locates the configured device on the bus and opens it. Matching is a
//! plain VID:PID equality check; which device to drive is decided by the
//! configuration, not by this module.

use anyhow::{Context as _, Result, anyhow};
use rusb::{Context, DeviceHandle, UsbContext};
use tracing::debug;

/// Find and open the first device matching `vendor_id:product_id`.
pub fn open_device(ctx: &Context, vendor_id: u16, product_id: u16) -> Result<DeviceHandle<Context>> {
    for device in ctx.devices().context("Failed to list USB devices")?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(e) => {
                debug!("Skipping device without readable descriptor: {}", e);
                continue;
            }
        };

        if descriptor.vendor_id() == vendor_id && descriptor.product_id() == product_id {
            debug!(
                "Found {:04x}:{:04x} on bus {:03} device {:03}",
                vendor_id,
                product_id,
                device.bus_number(),
                device.address()
            );
            return device.open().with_context(|| {
                format!("Failed to open device {:04x}:{:04x}", vendor_id, product_id)
            });
        }
    }

    Err(anyhow!("No device {:04x}:{:04x} found", vendor_id, product_id))
}

/// Descriptor summary of one connected device, for diagnostics.
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus_number: u8,
    pub device_address: u8,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

/// Enumerate connected devices for `--list-devices`.
///
/// String descriptors are best-effort: devices that cannot be opened are
/// still listed, just without strings.
pub fn list_devices(ctx: &Context) -> Result<Vec<DeviceSummary>> {
    let mut summaries = Vec::new();

    for device in ctx.devices().context("Failed to list USB devices")?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(e) => {
                debug!("Skipping device without readable descriptor: {}", e);
                continue;
            }
        };

        let strings = device
            .open()
            .ok()
            .and_then(|handle| read_string_descriptors(&handle, &descriptor));
        let (manufacturer, product, serial_number) = strings.unwrap_or((None, None, None));

        summaries.push(DeviceSummary {
            vendor_id: descriptor.vendor_id(),
            product_id: descriptor.product_id(),
            bus_number: device.bus_number(),
            device_address: device.address(),
            manufacturer,
            product,
            serial_number,
        });
    }

    Ok(summaries)
}

/// Read string descriptors from device
fn read_string_descriptors(
    handle: &DeviceHandle<Context>,
    descriptor: &rusb::DeviceDescriptor,
) -> Option<(Option<String>, Option<String>, Option<String>)> {
    let manufacturer = descriptor
        .manufacturer_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());

    let product = descriptor
        .product_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());

    let serial_number = descriptor
        .serial_number_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());

    Some((manufacturer, product, serial_number))
}
