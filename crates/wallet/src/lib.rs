//! Wallet session layer for the character-minting game client.
//!
//! This crate reconciles the first two of the three facts the client
//! synchronizes: who is connected (the wallet session) and where the
//! provider is pointed (the active network). It wraps whatever wallet
//! provider the host environment injects behind an object-safe trait and
//! exposes channel-backed state so downstream layers react to transitions
//! instead of polling.
//!
//! Modules are organized by responsibility:
//! - [`provider`] wraps the injected provider and its network notifications
//! - [`connector`] owns the account session and its restore/connect flows
//! - [`network`] gates progress on the chain the provider reports
//! - [`mock`] provides an in-memory provider for tests

pub mod connector;
pub mod error;
pub mod network;
pub mod provider;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use connector::{Session, WalletConnector};
pub use error::{Result, WalletError};
pub use network::{NetworkGuard, NetworkState, NetworkStatus};
pub use provider::{ProviderError, ProviderGateway, WalletProvider};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockWalletProvider;
