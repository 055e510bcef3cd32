//! Environment abstraction for deterministic testing.
//!
//! Decouples session logic from system resources (time, randomness). The
//! simulation harness supplies a virtual clock and a seeded RNG; binaries
//! supply the system clock and OS entropy.

use std::time::Duration;

/// Abstract environment providing time, randomness, and async primitives.
///
/// # Invariants
///
/// - `now()` never goes backwards
/// - Given the same seed, simulated implementations produce the same random
///   sequence
pub trait Environment: Clone + Send + Sync + 'static {
    /// Instant type used by this environment.
    ///
    /// Production uses `std::time::Instant`; simulation uses a virtual
    /// instant advanced by the test.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this; state machines never do.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Random identifier rendered as 16 lowercase hex digits.
    fn random_id(&self) -> String {
        format!("{:016x}", self.random_u64())
    }
}
