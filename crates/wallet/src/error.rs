//! Error types for wallet session operations.

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that can occur while establishing or restoring a wallet session.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No wallet provider is injected into the host environment.
    #[error("no wallet provider detected")]
    ProviderMissing,

    /// The user declined the authorization prompt.
    #[error("connection request rejected by the user")]
    UserRejected,

    /// Any other provider fault.
    #[error("provider fault: {0}")]
    ConnectionError(String),
}

impl From<ProviderError> for WalletError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Rejected => WalletError::UserRejected,
            ProviderError::Rpc(reason) => WalletError::ConnectionError(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
