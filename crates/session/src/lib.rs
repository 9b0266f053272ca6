//! Session core for rnr-usb
//!
//! Implements the single-attach device session: open a claimed bulk
//! interface, resolve the IN and OUT pipes, send the handshake, read the
//! reply, then keep listening for a bounded window before releasing
//! everything. The USB transport sits behind traits so the whole state
//! machine runs against simulated endpoints in tests.
//!
//! # Example
//!
//! ```
//! use session::test_utils::{MockInterface, ReadScript, RecordingDelay};
//! use session::{SessionConfig, run_session};
//!
//! let mut iface = MockInterface::new();
//! iface.script_read(ReadScript::EchoWrite); // handshake reply
//! iface.script_reads(10, ReadScript::Data(b"tick".to_vec()));
//!
//! let report = run_session(&mut iface, &SessionConfig::default(), &RecordingDelay::default());
//! assert!(report.success);
//! ```

pub mod buffers;
pub mod controller;
pub mod delay;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod poll;
pub mod test_utils;
pub mod transport;

pub use buffers::{InboundText, ReadStatus, TransferBuffer};
pub use controller::{Phase, SessionConfig, SessionReport, run_session};
pub use delay::{Delay, ThreadDelay};
pub use error::SessionError;
pub use exchange::{ExchangeOutcome, exchange};
pub use logging::setup_logging;
pub use poll::{PollPolicy, poll};
pub use transport::{BulkInterface, BulkPipe};
