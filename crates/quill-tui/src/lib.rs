//! Terminal UI for Quill
//!
//! A thin shell over [`quill_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`quill_app::Runtime`].
//!
//! This crate only handles keys, rendering and the socket handle.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod input;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use input::{InputState, KeyInput};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
