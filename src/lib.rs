//! Quill workspace root.
//!
//! The crates live under `crates/`. This package exists so `cargo-husky`
//! can install the repository git hooks on the first `cargo test`.
