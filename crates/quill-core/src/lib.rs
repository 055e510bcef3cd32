//! Socket session core for Quill.
//!
//! [`Session`] owns the connection lifecycle of one chat socket: connecting,
//! fixed-interval reconnection with a bounded attempt budget, outbound
//! request serialization and inbound frame decoding. It performs no I/O.
//! Every operation takes the current time and returns [`SessionAction`]s for
//! a driver to execute, so the whole lifecycle is testable with virtual time.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod session;

pub use env::Environment;
pub use error::SessionError;
pub use session::{
    CloseInfo, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_INTERVAL, DEFAULT_WEBSOCKET_URL,
    SendOutcome, Session, SessionAction, SessionConfig, SessionPhase, SessionSnapshot,
};
