//! The transport seam between the typed client and the chain.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot};

use crate::codec::RawLog;
use crate::error::{ContractError, TransportError};
use crate::types::CharacterRecord;

/// Identifier of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxId(pub B256);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a mint transaction once included in a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx: TxId,
    pub token_id: U256,
    pub character_index: u64,
}

/// Handle to a submitted mint awaiting block inclusion.
///
/// Submission returns this immediately; inclusion is a separate
/// suspension point the caller opts into with [`wait`](Self::wait).
pub struct PendingMint {
    tx: TxId,
    included: oneshot::Receiver<Result<MintReceipt, TransportError>>,
}

impl PendingMint {
    pub fn new(
        tx: TxId,
        included: oneshot::Receiver<Result<MintReceipt, TransportError>>,
    ) -> Self {
        Self { tx, included }
    }

    pub fn tx_id(&self) -> &TxId {
        &self.tx
    }

    /// Suspend until the transaction is included in a block.
    pub async fn wait(self) -> Result<MintReceipt, ContractError> {
        match self.included.await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(TransportError::ExecutionReverted(reason))) => {
                Err(ContractError::Reverted(reason))
            }
            Ok(Err(other)) => Err(ContractError::CallFailed(other.to_string())),
            Err(_) => Err(ContractError::CallFailed(
                "transport dropped the confirmation channel".into(),
            )),
        }
    }
}

/// Low-level surface of the deployed game contract.
///
/// Implementations own ABI encoding, signing requests, and RPC plumbing.
/// The typed [`ContractClient`](crate::ContractClient) layers decoding
/// and precondition checks on top and is what the session stack consumes.
#[async_trait]
pub trait ContractTransport: Send + Sync {
    /// Enumerate the mintable character archetypes, in contract order.
    async fn default_characters(&self) -> Result<Vec<CharacterRecord>, TransportError>;

    /// Character currently held by `owner`.
    ///
    /// A vacant record (empty name) means the wallet holds none; the
    /// contract never signals absence any other way.
    async fn character_of(&self, owner: Address) -> Result<CharacterRecord, TransportError>;

    /// Submit a mint of the archetype at `character_index`, signed for
    /// `minter`. Returns as soon as the transaction is accepted for
    /// submission; inclusion is awaited on the returned handle.
    async fn submit_mint(
        &self,
        minter: Address,
        character_index: u64,
    ) -> Result<PendingMint, TransportError>;

    /// Raw logs emitted by the contract. Dropping the receiver is the
    /// matching unsubscribe.
    fn subscribe_logs(&self) -> broadcast::Receiver<RawLog>;
}
