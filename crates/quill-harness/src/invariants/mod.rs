//! Client-wide invariants.
//!
//! A [`SystemSnapshot`] captures what the app and session expose after a
//! step. Each [`Invariant`] inspects the snapshot and reports a
//! [`Violation`] when a property that must hold across every interleaving
//! of socket events, replies and edits does not.
//!
//! ```ignore
//! let snapshot = SystemSnapshot::from_app(&app).with_session(session.snapshot(), 5);
//! InvariantRegistry::standard().check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{
    IdleStreamEmpty, NoAdjacentText, PendingReconnectImpliesDisconnected, ReconnectBound,
    TranscriptGrowth, UniqueSelectionTexts,
};
pub use snapshot::SystemSnapshot;

/// Outcome of one invariant check.
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which invariant failed.
    pub invariant: &'static str,
    /// What was observed.
    pub message: String,
}

impl Violation {
    pub(crate) fn new(invariant: &'static str, message: impl Into<String>) -> Self {
        Self { invariant, message: message.into() }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Property of the client state that holds after every step.
pub trait Invariant: Send + Sync {
    /// Stable name used in violation reports.
    fn name(&self) -> &'static str;

    /// Inspect `state`.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Ordered set of invariants run together.
#[derive(Default)]
pub struct InvariantRegistry {
    checks: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// Registry with no checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection, session, stream and transcript invariants.
    pub fn standard() -> Self {
        Self::new()
            .with(UniqueSelectionTexts)
            .with(ReconnectBound)
            .with(PendingReconnectImpliesDisconnected)
            .with(IdleStreamEmpty)
            .with(NoAdjacentText)
            .with(TranscriptGrowth)
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with<I: Invariant + 'static>(mut self, invariant: I) -> Self {
        self.add(invariant);
        self
    }

    /// Register another check.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.checks.push(Box::new(invariant));
    }

    /// Run every check, collecting all violations.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> =
            self.checks.iter().filter_map(|check| check.check(state).err()).collect();
        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Run every check and panic with all violations listed.
    #[allow(clippy::panic, reason = "test helper")]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let report = violations.iter().map(Violation::to_string).collect::<Vec<_>>();
            panic!("invariants broken {context}:\n  {}", report.join("\n  "));
        }
    }

    /// Names of the registered checks, in run order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|check| check.name())
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True if no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
