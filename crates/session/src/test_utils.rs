//! Test utilities for rnr-usb
//!
//! Scripted mock transport and delay recorder used by the session tests and
//! the driver integration tests. The mock records every transport call in
//! order, so tests can assert resource discipline (each resolve matched by
//! a release, close last) as well as transfer behavior.
//!
//! # Example
//!
//! ```
//! use session::test_utils::{MockInterface, ReadScript};
//! use session::transport::BulkInterface;
//!
//! let mut iface = MockInterface::new();
//! iface.script_read(ReadScript::Data(b"ready".to_vec()));
//!
//! iface.open().unwrap();
//! let pipe = iface.resolve_pipe(protocol::BULK_IN).unwrap();
//! drop(pipe);
//! iface.close();
//! ```

use crate::delay::Delay;
use crate::error::SessionError;
use crate::transport::{BulkInterface, BulkPipe};
use protocol::{EndpointAddress, TransferError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open,
    ResolvePipe(EndpointAddress),
    Write {
        endpoint: EndpointAddress,
        len: usize,
    },
    Read {
        endpoint: EndpointAddress,
    },
    ReleasePipe(EndpointAddress),
    Close,
}

/// Shared, ordered record of transport calls.
pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Scripted response for one inbound read.
#[derive(Debug, Clone)]
pub enum ReadScript {
    /// Serve these bytes, cut to the caller's buffer when longer.
    Data(Vec<u8>),
    /// Fail with this error.
    Fail(TransferError),
    /// Echo back the most recent write.
    EchoWrite,
}

/// Mock bulk interface driven by read/write scripts.
///
/// Reads with no script fail with [`TransferError::Timeout`], which models
/// a silent device.
pub struct MockInterface {
    log: CallLog,
    open_error: Option<SessionError>,
    missing: Vec<EndpointAddress>,
    reads: Arc<Mutex<VecDeque<ReadScript>>>,
    write_errors: Arc<Mutex<VecDeque<TransferError>>>,
    written: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockInterface {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            open_error: None,
            missing: Vec::new(),
            reads: Arc::new(Mutex::new(VecDeque::new())),
            write_errors: Arc::new(Mutex::new(VecDeque::new())),
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the shared call log.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Make the next `open` fail with `error`.
    pub fn fail_open(&mut self, error: SessionError) {
        self.open_error = Some(error);
    }

    /// Make resolution of `address` fail with `EndpointNotFound`.
    pub fn drop_endpoint(&mut self, address: EndpointAddress) {
        self.missing.push(address);
    }

    /// Queue a failure for the next write.
    pub fn fail_next_write(&mut self, error: TransferError) {
        self.write_errors.lock().unwrap().push_back(error);
    }

    /// Queue one scripted inbound read.
    pub fn script_read(&mut self, script: ReadScript) {
        self.reads.lock().unwrap().push_back(script);
    }

    /// Queue `count` copies of the same scripted read.
    pub fn script_reads(&mut self, count: usize, script: ReadScript) {
        let mut reads = self.reads.lock().unwrap();
        for _ in 0..count {
            reads.push_back(script.clone());
        }
    }

    /// Every payload written so far, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.written.lock().unwrap().clone()
    }
}

impl Default for MockInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkInterface for MockInterface {
    type Pipe = MockPipe;

    fn open(&mut self) -> Result<(), SessionError> {
        self.log.lock().unwrap().push(Call::Open);
        match self.open_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn resolve_pipe(&mut self, address: EndpointAddress) -> Result<MockPipe, SessionError> {
        self.log.lock().unwrap().push(Call::ResolvePipe(address));
        if self.missing.contains(&address) {
            return Err(SessionError::EndpointNotFound { address });
        }
        Ok(MockPipe {
            endpoint: address,
            log: self.log.clone(),
            reads: self.reads.clone(),
            write_errors: self.write_errors.clone(),
            written: self.written.clone(),
        })
    }

    fn close(&mut self) {
        self.log.lock().unwrap().push(Call::Close);
    }
}

/// Pipe handed out by [`MockInterface`]. Dropping it records the release.
pub struct MockPipe {
    endpoint: EndpointAddress,
    log: CallLog,
    reads: Arc<Mutex<VecDeque<ReadScript>>>,
    write_errors: Arc<Mutex<VecDeque<TransferError>>>,
    written: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl BulkPipe for MockPipe {
    fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<usize, TransferError> {
        self.log.lock().unwrap().push(Call::Write {
            endpoint: self.endpoint,
            len: data.len(),
        });
        if let Some(error) = self.write_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.written.lock().unwrap().push(data.to_vec());
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, TransferError> {
        self.log.lock().unwrap().push(Call::Read {
            endpoint: self.endpoint,
        });
        let script = self
            .reads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ReadScript::Fail(TransferError::Timeout));

        let bytes = match script {
            ReadScript::Data(bytes) => bytes,
            ReadScript::Fail(error) => return Err(error),
            ReadScript::EchoWrite => self.written.lock().unwrap().last().cloned().unwrap_or_default(),
        };

        let len = bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }
}

impl Drop for MockPipe {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(Call::ReleasePipe(self.endpoint));
    }
}

/// Minimal pipe serving the same bytes on every read. Handy for buffer
/// tests that need no interface machinery.
pub struct FixedPipe {
    bytes: Vec<u8>,
}

impl FixedPipe {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl BulkPipe for FixedPipe {
    fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<usize, TransferError> {
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, TransferError> {
        let len = self.bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&self.bytes[..len]);
        Ok(len)
    }
}

/// Delay that records requested intervals instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    intervals: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    /// Every interval requested so far, in order.
    pub fn intervals(&self) -> Vec<Duration> {
        self.intervals.lock().unwrap().clone()
    }
}

impl Delay for RecordingDelay {
    fn sleep(&self, interval: Duration) {
        self.intervals.lock().unwrap().push(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{BULK_IN, BULK_OUT};

    #[test]
    fn test_mock_records_calls_in_order() {
        let mut iface = MockInterface::new();
        let log = iface.log();

        iface.open().unwrap();
        let pipe = iface.resolve_pipe(BULK_IN).unwrap();
        drop(pipe);
        iface.close();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Call::Open,
                Call::ResolvePipe(BULK_IN),
                Call::ReleasePipe(BULK_IN),
                Call::Close,
            ]
        );
    }

    #[test]
    fn test_echo_serves_last_write() {
        let mut iface = MockInterface::new();
        iface.script_read(ReadScript::EchoWrite);
        iface.open().unwrap();

        let mut out_pipe = iface.resolve_pipe(BULK_OUT).unwrap();
        let mut in_pipe = iface.resolve_pipe(BULK_IN).unwrap();

        out_pipe.write(b"marco", Duration::ZERO).unwrap();

        let mut buf = [0u8; 16];
        let len = in_pipe.read(&mut buf, Duration::ZERO).unwrap();
        assert_eq!(&buf[..len], b"marco");
    }

    #[test]
    fn test_unscripted_read_times_out() {
        let mut iface = MockInterface::new();
        iface.open().unwrap();
        let mut pipe = iface.resolve_pipe(BULK_IN).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(
            pipe.read(&mut buf, Duration::ZERO),
            Err(TransferError::Timeout)
        );
    }

    #[test]
    fn test_missing_endpoint_fails_resolution() {
        let mut iface = MockInterface::new();
        iface.drop_endpoint(BULK_IN);
        iface.open().unwrap();

        let error = iface.resolve_pipe(BULK_IN).err().unwrap();
        assert_eq!(error, SessionError::EndpointNotFound { address: BULK_IN });
    }
}
