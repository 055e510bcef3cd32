//! Fuzz target for the Session state machine
//!
//! Ensure the reconnect budget and shutdown hold under any event order
//!
//! # Strategy
//!
//! - Lifecycle: connect, retry, disconnect, shutdown in any order
//! - Socket reports: opens, closes and errors, including stale ones
//! - Time: arbitrary jumps, including ones short of the interval
//!
//! # Invariants
//!
//! - Reconnect attempts never exceed the configured maximum
//! - A pending reconnect implies the `Closed` phase
//! - At most one `Open` per operation
//! - After shutdown no operation yields `Open` or `Send`

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quill_core::{CloseInfo, SendOutcome, Session, SessionAction, SessionConfig, SessionPhase};
use quill_proto::ModelId;

#[derive(Debug, Clone, Arbitrary)]
enum SessionOp {
    Connect,
    Retry,
    Disconnect,
    Shutdown,
    Opened,
    Closed { code: Option<u16> },
    Failed,
    Advance { millis: u16 },
    Send { is_agent: bool },
}

fuzz_target!(|ops: Vec<SessionOp>| {
    let config = SessionConfig::default();
    let max = config.max_reconnect_attempts;
    let mut session: Session = Session::new(config);
    let mut now = Instant::now();
    let mut shut_down = false;

    for op in ops {
        let actions = match op {
            SessionOp::Connect => session.connect(now),
            SessionOp::Retry => session.retry(now),
            SessionOp::Disconnect => session.disconnect(),
            SessionOp::Shutdown => {
                shut_down = true;
                session.shutdown()
            }
            SessionOp::Opened => session.on_open(now),
            SessionOp::Closed { code } => {
                session.on_close(now, &CloseInfo { code, reason: String::new() })
            }
            SessionOp::Failed => session.on_error(now, "fuzz"),
            SessionOp::Advance { millis } => {
                now += Duration::from_millis(u64::from(millis));
                session.tick(now)
            }
            SessionOp::Send { is_agent } => {
                match session.send_message(now, "hi", ModelId::default(), is_agent) {
                    Ok(SendOutcome::Sent(actions) | SendOutcome::Deferred(actions)) => actions,
                    Err(_) => {
                        assert!(shut_down, "send may only fail after shutdown");
                        Vec::new()
                    }
                }
            }
        };

        let opens = actions.iter().filter(|a| matches!(a, SessionAction::Open { .. })).count();
        assert!(opens <= 1, "multiple opens in one step");

        if shut_down {
            assert!(
                actions.iter().all(|a| !matches!(a, SessionAction::Open { .. } | SessionAction::Send(_))),
                "socket activity after shutdown: {actions:?}"
            );
        }

        let snapshot = session.snapshot();
        assert!(snapshot.reconnect_attempts <= max);
        if snapshot.reconnect_pending {
            assert_eq!(snapshot.phase, SessionPhase::Closed);
        }
    }
});
