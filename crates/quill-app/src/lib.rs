//! Application layer for Quill
//!
//! Pure state machines and generic runtime for UI and protocol orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (draft, transcript, selections, preferences)
//! - [`StreamAssembler`]: assembles streamed replies between status frames
//! - [`SelectionSet`] and [`highlight`]: selected passages and keeping their
//!   highlights anchored while the document changes
//! - [`Bridge`]: Protocol bridge (translates App actions to client events)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`storage`]: key-value persistence for preferences

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
pub mod document;
mod driver;
mod event;
pub mod highlight;
mod persist;
mod runtime;
pub mod selection;
mod state;
pub mod storage;
mod stream;
mod transcript;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, TransportCommand};
pub use document::{Block, DocumentSurface, Highlight, TextDocument, TextRange};
pub use driver::Driver;
pub use event::AppEvent;
pub use highlight::{Anchor, HighlightReport, Resolved, SyncReport};
pub use persist::{PersistPolicy, PersistedState, STATE_KEY, load_state, save_state};
pub use runtime::Runtime;
pub use selection::{
    NewSelection, SELECTION_PALETTE, SelectionError, SelectionId, SelectionItem, SelectionSet,
};
pub use state::ConnectionState;
pub use storage::{MemoryStore, RedbStore, StateStore, StorageError};
pub use stream::{StreamAssembler, StreamOutcome, StreamPhase};
pub use transcript::Transcript;
