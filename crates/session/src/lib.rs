//! Session/ownership synchronization for the character-minting client.
//!
//! This crate reconciles wallet connection, network identity, and
//! on-chain ownership into one consistent client-side view, and drives
//! the mint-request lifecycle through on-chain confirmation. Components
//! activate demand-driven: nothing touches the contract until the wallet
//! is connected on the expected network.
//!
//! Modules are organized by responsibility:
//! - [`ownership`] re-derives what the session account holds
//! - [`mint`] drives a single mint from submission to confirmation
//! - [`bridge`] feeds contract mint events back into re-resolution
//! - [`sync`] owns the per-session store and the activation lifecycle

pub mod bridge;
pub mod error;
pub mod mint;
pub mod ownership;
pub mod sync;

pub use bridge::EventBridge;
pub use error::{Result, SessionError};
pub use mint::{MintCoordinator, MintStatus};
pub use ownership::{OwnershipResolver, OwnershipState};
pub use sync::GameSession;
