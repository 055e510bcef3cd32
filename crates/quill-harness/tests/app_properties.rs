//! Property-based tests for the App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! This ensures behavioral correctness across all possible execution paths.

use std::time::Duration;

use quill_app::{
    App, AppAction, AppEvent, Bridge, DocumentSurface, MemoryStore, NewSelection, PersistPolicy,
    PersistedState, SelectionSet, StreamAssembler, TextDocument, TextRange, TransportCommand,
    highlight, load_state, save_state,
};
use quill_client::{CloseInfo, SessionConfig, TransportEvent};
use quill_core::Environment;
use quill_harness::{InvariantRegistry, SimEnv, SystemSnapshot};
use quill_proto::{CodeBlock, ContentItem, ModelId, StreamStatus, UiElement};
use proptest::prelude::*;

fn text_item() -> impl Strategy<Value = ContentItem> {
    "[a-z ]{0,8}".prop_map(ContentItem::text)
}

fn element_item() -> impl Strategy<Value = ContentItem> {
    ("[a-z]{1,6}", "[a-z(); ]{0,12}").prop_map(|(language, code)| {
        ContentItem::element(UiElement::CodeBlock(CodeBlock { language, code }))
    })
}

fn chunk_strategy() -> impl Strategy<Value = ContentItem> {
    prop_oneof![3 => text_item(), 1 => element_item()]
}

fn status_strategy() -> impl Strategy<Value = StreamStatus> {
    prop_oneof![
        Just(StreamStatus::Thinking),
        Just(StreamStatus::Complete),
        Just(StreamStatus::Error),
    ]
}

fn model_strategy() -> impl Strategy<Value = ModelId> {
    prop::sample::select(ModelId::ALL.to_vec())
}

/// User and server inputs to the app.
#[derive(Debug, Clone)]
enum Op {
    Status(StreamStatus),
    Chunk(ContentItem),
    Submit(String),
    Select(String),
    UnselectFirst,
    ClearTranscript,
    Deferred,
    Resize(u16, u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => status_strategy().prop_map(Op::Status),
        4 => chunk_strategy().prop_map(Op::Chunk),
        1 => "[a-z ]{0,10}".prop_map(Op::Submit),
        2 => "[a-c ]{0,4}".prop_map(Op::Select),
        1 => Just(Op::UnselectFirst),
        1 => Just(Op::ClearTranscript),
        1 => Just(Op::Deferred),
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| Op::Resize(c, r)),
    ]
}

fn apply(app: &mut App, op: Op) -> Vec<AppAction> {
    match op {
        Op::Status(status) => app.handle(AppEvent::Status(status)),
        Op::Chunk(item) => app.handle(AppEvent::Chunk(item)),
        Op::Submit(text) => {
            app.set_draft(text);
            app.submit()
        },
        Op::Select(text) => app.add_selection(NewSelection::new(text)),
        Op::UnselectFirst => match app.selections().items().first() {
            Some(item) => {
                let id = item.id.clone();
                app.remove_selection(&id)
            },
            None => vec![],
        },
        Op::ClearTranscript => app.clear_transcript(),
        Op::Deferred => app.handle(AppEvent::SendDeferred { reason: "not connected".into() }),
        Op::Resize(cols, rows) => app.handle(AppEvent::Resize(cols, rows)),
    }
}

proptest! {
    /// App invariants hold for arbitrary operation sequences.
    #[test]
    fn prop_app_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut app = App::new("ws://localhost:8000/ws/chat", PersistPolicy::WithTranscript);
        let invariants = InvariantRegistry::standard();
        let mut history = vec![app.transcript().len()];

        for op in ops {
            let _ = apply(&mut app, op);
            history.push(app.transcript().len());

            let snapshot =
                SystemSnapshot::from_app(&app).with_transcript_history(history.iter().copied());
            prop_assert!(invariants.check_all(&snapshot).is_ok(), "{:?}", invariants.check_all(&snapshot));
        }
    }

    /// Consecutive text chunks collapse into one item holding their
    /// concatenation in arrival order.
    #[test]
    fn prop_text_chunks_merge(texts in prop::collection::vec("[a-zA-Z0-9 ]{0,6}", 1..30)) {
        let mut assembler = StreamAssembler::new();
        assembler.on_status(StreamStatus::Thinking);
        for text in &texts {
            assembler.on_chunk(ContentItem::text(text.clone()));
        }

        prop_assert_eq!(assembler.buffer(), &[ContentItem::text(texts.concat())][..]);
    }

    /// `complete` appends exactly one message holding the whole buffer in
    /// order and leaves the buffer empty.
    #[test]
    fn prop_complete_commits_whole_buffer(chunks in prop::collection::vec(chunk_strategy(), 1..20)) {
        let mut app = App::new("ws://x", PersistPolicy::PreferencesOnly);
        app.handle(AppEvent::Status(StreamStatus::Thinking));
        for chunk in chunks {
            app.handle(AppEvent::Chunk(chunk));
        }
        let buffered = app.stream().buffer().to_vec();
        let before = app.transcript().len();

        app.handle(AppEvent::Status(StreamStatus::Complete));

        prop_assert_eq!(app.transcript().len(), before + 1);
        prop_assert_eq!(&app.transcript().messages()[before].content, &buffered);
        prop_assert!(app.stream().buffer().is_empty());
    }

    /// `error` never adds to the transcript and always empties the buffer.
    #[test]
    fn prop_error_discards(chunks in prop::collection::vec(chunk_strategy(), 0..20)) {
        let mut app = App::new("ws://x", PersistPolicy::PreferencesOnly);
        app.handle(AppEvent::Status(StreamStatus::Thinking));
        for chunk in chunks {
            app.handle(AppEvent::Chunk(chunk));
        }

        app.handle(AppEvent::Status(StreamStatus::Error));

        prop_assert!(app.transcript().is_empty());
        prop_assert!(app.stream().buffer().is_empty());
        prop_assert!(!app.is_loading());
    }

    /// Adding the same trimmed text twice keeps one item.
    #[test]
    fn prop_duplicate_selection_suppressed(
        text in "[A-Za-z0-9%][A-Za-z0-9% ]{0,20}[A-Za-z0-9%]",
        left in "[ \t]{0,3}",
        right in "[ \t\n]{0,3}",
    ) {
        let mut set = SelectionSet::new();
        set.add(NewSelection::new(text.clone())).unwrap();
        let second = set.add(NewSelection::new(format!("{left}{text}{right}")));

        prop_assert!(second.is_err());
        prop_assert_eq!(set.len(), 1);
    }

    /// A stale stored range falls back to the paragraph that holds the
    /// text.
    #[test]
    fn prop_stale_range_uses_paragraph(
        words in prop::collection::vec("[A-Za-z0-9%]{1,8}( [A-Za-z0-9%]{1,8}){1,4}", 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let paragraphs: Vec<String> =
            words.iter().enumerate().map(|(i, w)| format!("[{i}] {w}")).collect();
        let target = pick.index(paragraphs.len());
        let doc = TextDocument::from_blocks(paragraphs.clone());

        let mut set = SelectionSet::new();
        set.add(NewSelection::new(paragraphs[target].clone()).with_range(TextRange::new(0, 5)))
            .unwrap();

        let resolved = highlight::resolve_range(&set.items()[0], &doc).unwrap();
        prop_assert_eq!(resolved.range, doc.blocks()[target].content_range());
        prop_assert_eq!(doc.text_between(resolved.range.from, resolved.range.to), paragraphs[target].clone());
    }

    /// Deleting a selection's text from the document removes the selection
    /// on the next sync.
    #[test]
    fn prop_deleted_text_removes_selection(
        others in prop::collection::vec("[a-z]{1,10}", 0..5),
        position in any::<prop::sample::Index>(),
    ) {
        let target = "Q3 outlook is positive";
        let mut blocks = others.clone();
        let at = position.index(blocks.len() + 1);
        blocks.insert(at, format!("Our {target} today"));

        let mut doc = TextDocument::from_blocks(blocks);
        let mut set = SelectionSet::new();
        set.add(NewSelection::new(target)).unwrap();
        set.add(NewSelection::new("Our")).unwrap();

        doc.set_block(at, "Our Q3 outlook is negative today");
        let report = highlight::on_document_changed(&mut set, &mut doc);

        prop_assert_eq!(report.removed.len(), 1);
        prop_assert_eq!(set.len(), 1);
        prop_assert_eq!(set.items()[0].text.as_str(), "Our");
        prop_assert_eq!(doc.highlights().len(), 1);
    }

    /// Persisted preferences reload exactly; in-flight content never does.
    #[test]
    fn prop_preferences_round_trip(
        model in model_strategy(),
        is_agent in any::<bool>(),
        chunks in prop::collection::vec(chunk_strategy(), 0..5),
    ) {
        let store = MemoryStore::new();
        let mut app = App::new("ws://x", PersistPolicy::PreferencesOnly);
        app.select_model(model);
        app.set_agent(is_agent);
        app.handle(AppEvent::Status(StreamStatus::Thinking));
        for chunk in chunks {
            app.handle(AppEvent::Chunk(chunk));
        }
        save_state(&store, &app.persisted_state()).unwrap();

        let loaded = load_state(&store).unwrap().unwrap();
        prop_assert_eq!(&loaded, &PersistedState { selected_model: model, is_agent, messages: None });

        let mut restored = App::new("ws://x", PersistPolicy::PreferencesOnly);
        restored.restore(loaded);
        prop_assert_eq!(restored.selected_model(), model);
        prop_assert_eq!(restored.is_agent(), is_agent);
        prop_assert!(restored.stream().buffer().is_empty());
    }
}

/// Socket-side inputs to the bridge.
#[derive(Debug, Clone)]
enum SocketOp {
    Opened,
    Closed,
    Failed,
    Advance(u64),
    Connect,
    Retry,
    Disconnect,
    Send,
}

fn socket_op_strategy() -> impl Strategy<Value = SocketOp> {
    prop_oneof![
        2 => Just(SocketOp::Opened),
        2 => Just(SocketOp::Closed),
        2 => Just(SocketOp::Failed),
        3 => (0u64..5000).prop_map(SocketOp::Advance),
        1 => Just(SocketOp::Connect),
        1 => Just(SocketOp::Retry),
        1 => Just(SocketOp::Disconnect),
        1 => Just(SocketOp::Send),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Session invariants hold under arbitrary socket behavior, and at most
    /// one open is outstanding at a time.
    #[test]
    fn prop_session_invariants_hold(ops in prop::collection::vec(socket_op_strategy(), 0..80)) {
        let env = SimEnv::with_seed(9);
        let config = SessionConfig::default();
        let max = config.max_reconnect_attempts;
        let mut bridge = Bridge::new(env.clone(), config);
        let invariants = InvariantRegistry::standard();

        for op in ops {
            let _ = match op {
                SocketOp::Opened => bridge.handle_transport(TransportEvent::Opened),
                SocketOp::Closed => bridge.handle_transport(TransportEvent::Closed(CloseInfo::default())),
                SocketOp::Failed => bridge.handle_transport(TransportEvent::Failed("boom".into())),
                SocketOp::Advance(ms) => {
                    env.advance(Duration::from_millis(ms));
                    bridge.handle_tick(env.now())
                },
                SocketOp::Connect => bridge.process_app_action(AppAction::Connect),
                SocketOp::Retry => bridge.process_app_action(AppAction::Retry),
                SocketOp::Disconnect => bridge.process_app_action(AppAction::Disconnect),
                SocketOp::Send => bridge.process_app_action(AppAction::SendChat {
                    content: "hi".into(),
                    model: ModelId::default(),
                    is_agent: false,
                }),
            };

            let opens = bridge
                .take_outgoing()
                .into_iter()
                .filter(|c| matches!(c, TransportCommand::Open { .. }))
                .count();
            prop_assert!(opens <= 1);

            let session = bridge.client().session().snapshot();
            let snapshot = SystemSnapshot::empty().with_session(session, max);
            prop_assert!(invariants.check_all(&snapshot).is_ok(), "{:?}", invariants.check_all(&snapshot));
        }
    }
}

#[test]
fn invariant_violation_detected() {
    // Manually create invalid state to verify invariants catch it
    let snapshot = SystemSnapshot {
        selection_texts: vec!["same".into(), "same".into()],
        ..SystemSnapshot::empty()
    };

    let result = InvariantRegistry::standard().check_all(&snapshot);
    let violations = result.unwrap_err();
    assert!(violations.iter().any(|v| v.invariant == "unique_selection_texts"));
}
