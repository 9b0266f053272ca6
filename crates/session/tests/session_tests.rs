//! Session Integration Tests
//!
//! Exercises the full session state machine against the scripted mock
//! transport: resource discipline (resolve/release pairing, close ordering),
//! failure propagation, and the verdict rules.
//!
//! Run with: `cargo test -p session --test session_tests`

use protocol::{BULK_IN, BULK_OUT, HANDSHAKE_JSON, TransferError};
use session::test_utils::{Call, MockInterface, ReadScript, RecordingDelay};
use session::{Phase, PollPolicy, SessionConfig, SessionError, run_session};
use std::time::Duration;

fn config() -> SessionConfig {
    SessionConfig::default()
}

/// Count calls matching a predicate.
fn count(log: &[Call], pred: impl Fn(&Call) -> bool) -> usize {
    log.iter().filter(|c| pred(c)).count()
}

// ============================================================================
// Resource discipline
// ============================================================================

#[test]
fn test_full_session_releases_everything_before_close() {
    let mut iface = MockInterface::new();
    iface.script_reads(11, ReadScript::Data(b"{}".to_vec()));
    let log = iface.log();

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());
    assert!(report.success);

    let log = log.lock().unwrap();

    // Each successful resolve is matched by exactly one release.
    let resolves = count(&log, |c| matches!(c, Call::ResolvePipe(_)));
    let releases = count(&log, |c| matches!(c, Call::ReleasePipe(_)));
    assert_eq!(resolves, 2);
    assert_eq!(releases, 2);

    // Close happens exactly once, after every release.
    let closes = count(&log, |c| matches!(c, Call::Close));
    assert_eq!(closes, 1);
    let close_at = log.iter().position(|c| matches!(c, Call::Close)).unwrap();
    let last_release = log
        .iter()
        .rposition(|c| matches!(c, Call::ReleasePipe(_)))
        .unwrap();
    assert!(last_release < close_at);
}

#[test]
fn test_open_failure_closes_nothing() {
    let mut iface = MockInterface::new();
    iface.fail_open(SessionError::OpenFailed {
        source: TransferError::Access,
    });
    let log = iface.log();

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());

    assert!(!report.success);
    assert_eq!(report.reached, Phase::Idle);

    // Nothing was acquired, so nothing is released or closed.
    let log = log.lock().unwrap();
    assert_eq!(*log, vec![Call::Open]);
}

#[test]
fn test_in_endpoint_missing_aborts_without_transfers() {
    let mut iface = MockInterface::new();
    iface.drop_endpoint(BULK_IN);
    let log = iface.log();

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());

    assert!(!report.success);
    assert_eq!(report.reached, Phase::Opened);
    assert_eq!(
        report.error,
        Some(SessionError::EndpointNotFound { address: BULK_IN })
    );

    let log = log.lock().unwrap();
    assert_eq!(count(&log, |c| matches!(c, Call::Write { .. })), 0);
    assert_eq!(count(&log, |c| matches!(c, Call::Read { .. })), 0);
    assert_eq!(count(&log, |c| matches!(c, Call::Close)), 1);
}

#[test]
fn test_out_endpoint_missing_releases_in_pipe() {
    let mut iface = MockInterface::new();
    iface.drop_endpoint(BULK_OUT);
    let log = iface.log();

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());

    assert!(!report.success);

    let log = log.lock().unwrap();
    // IN resolved first and is the only pipe to release.
    assert_eq!(count(&log, |c| matches!(c, Call::ReleasePipe(_))), 1);
    assert!(log.contains(&Call::ReleasePipe(BULK_IN)));
    assert_eq!(count(&log, |c| matches!(c, Call::Write { .. })), 0);
    assert_eq!(count(&log, |c| matches!(c, Call::Close)), 1);
}

// ============================================================================
// Exchange and polling behavior
// ============================================================================

#[test]
fn test_handshake_payload_goes_out_verbatim() {
    let mut iface = MockInterface::new();
    iface.script_reads(11, ReadScript::Data(b"{}".to_vec()));

    run_session(&mut iface, &config(), &RecordingDelay::default());

    let writes = iface.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0], HANDSHAKE_JSON.as_bytes());
}

#[test]
fn test_write_failure_skips_exchange_read_but_polls() {
    let mut iface = MockInterface::new();
    iface.fail_next_write(TransferError::Pipe);
    iface.script_reads(10, ReadScript::Data(b"late".to_vec()));
    let log = iface.log();

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());

    assert!(!report.sent);
    assert!(report.response.is_none());

    // The listening window still ran all ten reads and the last one wins.
    assert!(report.success);
    let log = log.lock().unwrap();
    assert_eq!(count(&log, |c| matches!(c, Call::Read { .. })), 10);
}

#[test]
fn test_exchange_read_timeout_recovered_by_polls() {
    let mut iface = MockInterface::new();
    iface.script_read(ReadScript::Fail(TransferError::Timeout));
    iface.script_reads(10, ReadScript::Data(b"{\"ok\":true}".to_vec()));

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());

    // Verdict reflects the last poll only, not the failed exchange read.
    assert!(report.success);
    assert!(report.sent);
    assert_eq!(report.response, Some(Err(TransferError::Timeout)));
    assert_eq!(report.last_poll.unwrap().unwrap().text, "{\"ok\":true}");
}

#[test]
fn test_last_poll_failure_fails_session() {
    let mut iface = MockInterface::new();
    iface.script_read(ReadScript::EchoWrite);
    iface.script_reads(9, ReadScript::Data(b"tick".to_vec()));
    iface.script_read(ReadScript::Fail(TransferError::NoDevice));

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());

    // Nine good polls cannot outweigh a failed final one.
    assert!(!report.success);
    assert_eq!(report.last_poll, Some(Err(TransferError::NoDevice)));
}

#[test]
fn test_poll_count_and_interval_are_fixed() {
    let mut iface = MockInterface::new();
    let log = iface.log();
    let delay = RecordingDelay::default();

    let session_config = SessionConfig {
        poll: PollPolicy {
            iterations: 10,
            interval: Duration::from_millis(100),
        },
        ..config()
    };

    // Every read fails; the loop still runs to its fixed bound.
    let report = run_session(&mut iface, &session_config, &delay);

    assert!(!report.success);
    let log = log.lock().unwrap();
    // One exchange read plus ten polls.
    assert_eq!(count(&log, |c| matches!(c, Call::Read { .. })), 11);
    assert_eq!(delay.intervals(), vec![Duration::from_millis(100); 10]);
}

#[test]
fn test_echo_roundtrip_matches_payload() {
    let mut iface = MockInterface::new();
    iface.script_reads(11, ReadScript::EchoWrite);

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());

    assert!(report.success);
    let response = report.response.unwrap().unwrap();
    assert_eq!(response.text, HANDSHAKE_JSON);
    assert_eq!(response.len, HANDSHAKE_JSON.len());
}

#[test]
fn test_overlong_response_is_cut_at_ceiling() {
    let mut iface = MockInterface::new();
    iface.script_read(ReadScript::Data(vec![b'z'; 513]));
    iface.script_reads(10, ReadScript::Data(b"tick".to_vec()));

    let report = run_session(&mut iface, &config(), &RecordingDelay::default());

    let response = report.response.unwrap().unwrap();
    assert_eq!(response.len, 512);
    assert_eq!(response.text.len(), 512);
}

// ============================================================================
// Configuration overrides
// ============================================================================

#[test]
fn test_custom_endpoint_addresses_are_used() {
    use protocol::EndpointAddress;

    let mut iface = MockInterface::new();
    iface.script_reads(11, ReadScript::Data(b"{}".to_vec()));
    let log = iface.log();

    let session_config = SessionConfig {
        bulk_in: EndpointAddress(0x82),
        bulk_out: EndpointAddress(0x02),
        ..config()
    };

    let report = run_session(&mut iface, &session_config, &RecordingDelay::default());
    assert!(report.success);

    let log = log.lock().unwrap();
    assert!(log.contains(&Call::ResolvePipe(EndpointAddress(0x82))));
    assert!(log.contains(&Call::ResolvePipe(EndpointAddress(0x02))));
}

#[test]
fn test_zero_poll_iterations_fall_back_to_exchange_status() {
    let mut iface = MockInterface::new();
    iface.script_read(ReadScript::Data(b"hello".to_vec()));

    let session_config = SessionConfig {
        poll: PollPolicy {
            iterations: 0,
            interval: Duration::from_millis(100),
        },
        ..config()
    };

    let report = run_session(&mut iface, &session_config, &RecordingDelay::default());

    // With no polls the exchange read decides the verdict.
    assert!(report.success);
    assert!(report.last_poll.is_none());
}
