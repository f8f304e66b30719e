//! Error types for session synchronization.

use thiserror::Error;

use contract::ContractError;
use wallet::WalletError;

/// Errors surfaced by the session layer.
///
/// None of these are fatal: every failure is recoverable by retrying or
/// by the user correcting the external condition.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A second mint was attempted while one is live.
    #[error("a mint request is already in flight")]
    MintAlreadyInProgress,

    #[error("ownership resolution failed: {0}")]
    Resolution(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
