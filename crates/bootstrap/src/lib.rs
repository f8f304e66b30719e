//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading and session assembly that can be
//! reused by CLI, UI, or other front-end crates. Front-ends inject the
//! wallet provider and contract transport for their environment; this
//! crate wires them into a running [`session::GameSession`].

pub mod builder;
pub mod config;

pub use builder::SessionBuilder;
pub use config::ClientConfig;

/// Install a process-wide fmt subscriber, filtered by `RUST_LOG`.
///
/// For embedding binaries; call once at startup.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
