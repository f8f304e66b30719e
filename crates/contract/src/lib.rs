//! Typed access to the deployed character-minting game contract.
//!
//! The crate is layered the same way the session stack consumes it:
//!
//! ```text
//! ContractClient    : typed reads/writes, gated on session + network
//!      │
//! ContractTransport : ABI/RPC plumbing behind an async trait
//! ```
//!
//! [`ContractClient`] decodes wire records into native types and applies
//! the contract's vacancy convention; implementations of
//! [`ContractTransport`] own encoding and submission. Raw event logs flow
//! through unchanged and are decoded by consumers via [`codec`].

pub mod client;
pub mod codec;
pub mod error;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::ContractClient;
pub use codec::{CharacterMinted, RawLog};
pub use error::{ContractError, Result, TransportError};
pub use transport::{ContractTransport, MintReceipt, PendingMint, TxId};
pub use types::{CharacterNft, CharacterRecord, CharacterTemplate};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockContractTransport;
