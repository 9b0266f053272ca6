//! Claimed-interface wrapper implementing the session transport
//!
//! Maps the session's open/resolve/close contract onto rusb: claiming the
//! interface (detaching an active kernel driver first), checking the fixed
//! endpoint addresses against the claimed interface, and blocking
//! `write_bulk`/`read_bulk` with per-transfer timeouts.

use protocol::{EndpointAddress, TransferError};
use rusb::{Context, DeviceHandle};
use session::{BulkInterface, BulkPipe, SessionError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One claimed USB interface bound to the session transport contract.
pub struct RusbInterface {
    handle: Arc<DeviceHandle<Context>>,
    interface: u8,
    /// Endpoint addresses present on the interface, from its descriptors.
    endpoints: Vec<u8>,
    claimed: bool,
    /// A kernel driver was detached on open and gets reattached on close.
    reattach: bool,
}

impl RusbInterface {
    /// Wrap an opened device for the given interface number.
    ///
    /// Verifies the interface exists on the active configuration before the
    /// session attempts to claim it; a handle without it is the wrong kind
    /// of device.
    pub fn new(handle: DeviceHandle<Context>, interface: u8) -> Result<Self, SessionError> {
        let device = handle.device();
        let config = device
            .active_config_descriptor()
            .map_err(|e| SessionError::InterfaceUnavailable {
                reason: format!("no active configuration: {}", e),
            })?;

        let endpoints: Vec<u8> = config
            .interfaces()
            .find(|i| i.number() == interface)
            .ok_or_else(|| SessionError::InterfaceUnavailable {
                reason: format!("interface {} not present on device", interface),
            })?
            .descriptors()
            .flat_map(|alt| {
                alt.endpoint_descriptors()
                    .map(|ep| ep.address())
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(Self {
            handle: Arc::new(handle),
            interface,
            endpoints,
            claimed: false,
            reattach: false,
        })
    }
}

impl BulkInterface for RusbInterface {
    type Pipe = RusbPipe;

    fn open(&mut self) -> Result<(), SessionError> {
        // No pipes exist before open, so the handle is exclusively ours.
        let handle = Arc::get_mut(&mut self.handle).ok_or(SessionError::OpenFailed {
            source: TransferError::Busy,
        })?;

        match handle.kernel_driver_active(self.interface) {
            Ok(true) => {
                debug!("Detaching kernel driver from interface {}", self.interface);
                match handle.detach_kernel_driver(self.interface) {
                    Ok(()) => self.reattach = true,
                    Err(e) => warn!("Failed to detach kernel driver: {}", e),
                }
            }
            Ok(false) => {}
            Err(e) => debug!("Could not check kernel driver status: {}", e),
        }

        handle.claim_interface(self.interface).map_err(|e| {
            warn!("Failed to claim interface {}: {}", self.interface, e);
            SessionError::OpenFailed {
                source: map_rusb_error(e),
            }
        })?;

        self.claimed = true;
        debug!("Claimed interface {}", self.interface);
        Ok(())
    }

    fn resolve_pipe(&mut self, address: EndpointAddress) -> Result<RusbPipe, SessionError> {
        if !self.claimed {
            return Err(SessionError::InterfaceUnavailable {
                reason: "interface not claimed".to_string(),
            });
        }

        // Fixed addressing: the configured address must be present, but it
        // is never discovered from the descriptors.
        if !self.endpoints.contains(&address.0) {
            return Err(SessionError::EndpointNotFound { address });
        }

        debug!("Resolved pipe {}", address);
        Ok(RusbPipe {
            handle: self.handle.clone(),
            address,
        })
    }

    fn close(&mut self) {
        if !self.claimed {
            return;
        }
        self.claimed = false;

        match Arc::get_mut(&mut self.handle) {
            Some(handle) => {
                if let Err(e) = handle.release_interface(self.interface) {
                    warn!("Failed to release interface {}: {}", self.interface, e);
                }
                if self.reattach {
                    if let Err(e) = handle.attach_kernel_driver(self.interface) {
                        debug!("Could not reattach kernel driver: {}", e);
                    }
                }
                debug!("Released interface {}", self.interface);
            }
            // The controller drops every pipe before closing; hitting this
            // means a pipe leaked.
            None => warn!("Interface closed with pipes still outstanding"),
        }
    }
}

/// Exclusively owned bulk pipe over a claimed interface.
pub struct RusbPipe {
    handle: Arc<DeviceHandle<Context>>,
    address: EndpointAddress,
}

impl BulkPipe for RusbPipe {
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<usize, TransferError> {
        self.handle
            .write_bulk(self.address.0, data, timeout)
            .map_err(map_rusb_error)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransferError> {
        self.handle
            .read_bulk(self.address.0, buf, timeout)
            .map_err(map_rusb_error)
    }
}

/// Map rusb::Error to protocol::TransferError
pub fn map_rusb_error(err: rusb::Error) -> TransferError {
    match err {
        rusb::Error::Timeout => TransferError::Timeout,
        rusb::Error::Pipe => TransferError::Pipe,
        rusb::Error::NoDevice => TransferError::NoDevice,
        rusb::Error::NotFound => TransferError::NotFound,
        rusb::Error::Busy => TransferError::Busy,
        rusb::Error::Overflow => TransferError::Overflow,
        rusb::Error::Io => TransferError::Io,
        rusb::Error::InvalidParam => TransferError::InvalidParam,
        rusb::Error::Access => TransferError::Access,
        _ => TransferError::Other {
            message: err.to_string(),
        },
    }
}
