//! Deterministic simulation harness for Quill client testing.
//!
//! Virtual-time implementations of the Environment and Driver traits for
//! deterministic, reproducible testing of the session, the app state machine
//! and the runtime that ties them together.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for common
//! App/Session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    IdleStreamEmpty, Invariant, InvariantRegistry, InvariantResult, NoAdjacentText,
    PendingReconnectImpliesDisconnected, ReconnectBound, SystemSnapshot, TranscriptGrowth,
    UniqueSelectionTexts, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
