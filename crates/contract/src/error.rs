//! Error types for contract interaction.

use alloy_primitives::U256;
use thiserror::Error;

/// Transport layer errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("rpc fault: {0}")]
    Rpc(String),

    /// The node refused the transaction at submission time.
    #[error("submission reverted: {0}")]
    SubmissionReverted(String),

    /// The transaction was included in a block and reverted there.
    #[error("execution reverted: {0}")]
    ExecutionReverted(String),
}

/// Errors surfaced by the typed contract client.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Construction was attempted without a connected wallet on the
    /// expected network.
    #[error("contract client requires a connected wallet on the expected network")]
    ClientUnavailable,

    #[error("contract call failed: {0}")]
    CallFailed(String),

    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// A wire value does not fit the native integer the data model uses.
    #[error("{field} value {value} does not fit a native integer")]
    NumericOverflow { field: &'static str, value: U256 },

    #[error("malformed character record: {0}")]
    MalformedRecord(String),
}

pub type Result<T> = std::result::Result<T, ContractError>;
