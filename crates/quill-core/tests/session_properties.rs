//! Property tests for the session state machine.
//!
//! Drives the session with arbitrary interleavings of driver reports, user
//! operations and clock advances, and checks the reconnection invariants
//! after every step.

use std::time::{Duration, Instant};

use proptest::prelude::*;
use quill_core::{CloseInfo, Session, SessionAction, SessionConfig, SessionPhase};
use quill_proto::ModelId;

#[derive(Debug, Clone)]
enum Step {
    Connect,
    Retry,
    Disconnect,
    Opened,
    Closed,
    Failed,
    Send,
    Advance(u64),
}

fn arbitrary_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => Just(Step::Connect),
        1 => Just(Step::Retry),
        1 => Just(Step::Disconnect),
        3 => Just(Step::Opened),
        3 => Just(Step::Closed),
        2 => Just(Step::Failed),
        1 => Just(Step::Send),
        4 => (0u64..5000).prop_map(Step::Advance),
    ]
}

proptest! {
    #[test]
    fn reconnection_invariants_hold(steps in prop::collection::vec(arbitrary_step(), 0..200)) {
        let config = SessionConfig::default();
        let max = config.max_reconnect_attempts;
        let mut session: Session = Session::new(config);
        let mut now = Instant::now();

        for step in steps {
            let actions = match step {
                Step::Connect => session.connect(now),
                Step::Retry => session.retry(now),
                Step::Disconnect => session.disconnect(),
                Step::Opened => session.on_open(now),
                Step::Closed => session.on_close(now, &CloseInfo::default()),
                Step::Failed => session.on_error(now, "refused"),
                Step::Send => match session.send_message(now, "hi", ModelId::default(), false) {
                    Ok(_) => Vec::new(),
                    Err(e) => return Err(TestCaseError::fail(e.to_string())),
                },
                Step::Advance(ms) => {
                    now += Duration::from_millis(ms);
                    session.tick(now)
                },
            };

            prop_assert!(session.reconnect_attempts() <= max);
            if matches!(session.phase(), SessionPhase::Connecting | SessionPhase::Open) {
                prop_assert!(!session.reconnect_pending());
            }
            let schedules = actions
                .iter()
                .filter(|a| matches!(a, SessionAction::ScheduleReconnect { .. }))
                .count();
            prop_assert!(schedules <= 1);
        }
    }

    #[test]
    fn shutdown_silences_everything(steps in prop::collection::vec(arbitrary_step(), 0..50)) {
        let mut session: Session = Session::new(SessionConfig::default());
        let mut now = Instant::now();
        session.connect(now);
        session.shutdown();

        for step in steps {
            let actions = match step {
                Step::Connect => session.connect(now),
                Step::Retry => session.retry(now),
                Step::Disconnect => session.disconnect(),
                Step::Opened => session.on_open(now),
                Step::Closed => session.on_close(now, &CloseInfo::default()),
                Step::Failed => session.on_error(now, "refused"),
                Step::Send => {
                    prop_assert!(session.send_message(now, "hi", ModelId::default(), false).is_err());
                    Vec::new()
                },
                Step::Advance(ms) => {
                    now += Duration::from_millis(ms);
                    session.tick(now)
                },
            };

            prop_assert!(actions.iter().all(|a| matches!(a, SessionAction::Close)));
            prop_assert_eq!(session.phase(), SessionPhase::ShutDown);
        }
    }
}
