//! Property tests for the dispatch registry.
//!
//! Random subscribe/unsubscribe sequences across the three lists, checked
//! against a model of which handlers are live.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use proptest::prelude::*;
use quill_client::{Dispatcher, SubscriberError, SubscriberId};
use quill_proto::InboundFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum List {
    Messages,
    Status,
    Chunks,
}

#[derive(Debug, Clone)]
enum Op {
    Subscribe { list: List, fails: bool },
    Unsubscribe(prop::sample::Index),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    let list = prop_oneof![Just(List::Messages), Just(List::Status), Just(List::Chunks)];
    prop_oneof![
        3 => (list, any::<bool>()).prop_map(|(list, fails)| Op::Subscribe { list, fails }),
        1 => any::<prop::sample::Index>().prop_map(Op::Unsubscribe),
    ]
}

struct Tracked {
    id: SubscriberId,
    list: List,
    fails: bool,
    calls: Arc<AtomicUsize>,
}

fn subscribe(dispatcher: &mut Dispatcher, list: List, fails: bool) -> Tracked {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let outcome = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        if fails { Err(SubscriberError("rejected".into())) } else { Ok(()) }
    };
    let id = match list {
        List::Messages => dispatcher.subscribe_messages(move |_| outcome()),
        List::Status => dispatcher.subscribe_status(move |_| outcome()),
        List::Chunks => dispatcher.subscribe_chunks(move |_| outcome()),
    };
    Tracked { id, list, fails, calls }
}

fn count(live: &[Tracked], list: List) -> usize {
    live.iter().filter(|t| t.list == list).count()
}

proptest! {
    #[test]
    fn reports_match_live_subscribers(ops in prop::collection::vec(arbitrary_op(), 0..40)) {
        let mut dispatcher = Dispatcher::new();
        let mut live: Vec<Tracked> = Vec::new();
        let mut removed: Vec<Tracked> = Vec::new();

        for op in ops {
            match op {
                Op::Subscribe { list, fails } => {
                    live.push(subscribe(&mut dispatcher, list, fails));
                },
                Op::Unsubscribe(index) if !live.is_empty() => {
                    let tracked = live.remove(index.index(live.len()));
                    prop_assert!(dispatcher.unsubscribe(tracked.id));
                    prop_assert!(!dispatcher.unsubscribe(tracked.id));
                    removed.push(tracked);
                },
                Op::Unsubscribe(_) => {},
            }
        }
        prop_assert_eq!(dispatcher.len(), live.len());

        let status = InboundFrame::decode(r#"{"type":"status","status":"thinking"}"#).unwrap();
        let report = dispatcher.publish(&status);
        prop_assert_eq!(report.messages, count(&live, List::Messages));
        prop_assert_eq!(report.statuses, count(&live, List::Status));
        prop_assert_eq!(report.chunks, 0);

        let chunk = InboundFrame::decode(r#"{"type":"chunk","content":{"type":"text","text":"a"}}"#)
            .unwrap();
        let report = dispatcher.publish(&chunk);
        prop_assert_eq!(report.chunks, count(&live, List::Chunks));
        prop_assert_eq!(
            report.failed,
            live.iter().filter(|t| t.fails && t.list != List::Status).count()
        );

        for tracked in &live {
            let expected = match tracked.list {
                List::Messages => 2,
                List::Status | List::Chunks => 1,
            };
            prop_assert_eq!(tracked.calls.load(Ordering::SeqCst), expected);
        }
        for tracked in &removed {
            prop_assert_eq!(tracked.calls.load(Ordering::SeqCst), 0);
        }
    }
}
