//! Typed contract client bound to a connected session.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::broadcast;
use tracing::debug;

use wallet::{NetworkState, Session};

use crate::codec::RawLog;
use crate::error::{ContractError, Result};
use crate::transport::{ContractTransport, PendingMint};
use crate::types::{CharacterNft, CharacterTemplate};

/// Typed wrapper over the deployed game contract, acting as the session
/// account.
///
/// A client exists only while its preconditions hold: construction is
/// refused unless the wallet is connected and the provider points at the
/// expected network. After an account or network change the instance is
/// stale and must be discarded, never called through.
pub struct ContractClient {
    transport: Arc<dyn ContractTransport>,
    contract_address: Address,
    account: Address,
}

impl ContractClient {
    /// Bind the typed client for a connected, network-valid session.
    pub fn connect(
        transport: Arc<dyn ContractTransport>,
        contract_address: Address,
        session: &Session,
        network: NetworkState,
    ) -> Result<Self> {
        let account = match session.address {
            Some(address) if session.connected && network.allowed() => address,
            _ => return Err(ContractError::ClientUnavailable),
        };

        debug!("contract client bound to {account} against {contract_address}");
        Ok(Self {
            transport,
            contract_address,
            account,
        })
    }

    /// Account this client signs and queries as.
    pub fn account(&self) -> Address {
        self.account
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Ordered list of mintable archetypes, narrowed to native integers.
    pub async fn character_templates(&self) -> Result<Vec<CharacterTemplate>> {
        let records = self
            .transport
            .default_characters()
            .await
            .map_err(|err| ContractError::CallFailed(err.to_string()))?;

        records.into_iter().map(CharacterTemplate::try_from).collect()
    }

    /// Character owned by the session account, if any.
    ///
    /// The vacancy sentinel is applied before decoding, so the contract's
    /// "no character" record is `None` rather than a malformed error.
    pub async fn owned_character(&self) -> Result<Option<CharacterNft>> {
        let record = self
            .transport
            .character_of(self.account)
            .await
            .map_err(|err| ContractError::CallFailed(err.to_string()))?;

        if record.is_vacant() {
            return Ok(None);
        }

        CharacterNft::try_from(record).map(Some)
    }

    /// Submit a mint for the archetype at `character_index`.
    ///
    /// Returns the pending handle immediately; block inclusion is awaited
    /// separately via [`PendingMint::wait`].
    pub async fn mint_character(&self, character_index: u64) -> Result<PendingMint> {
        self.transport
            .submit_mint(self.account, character_index)
            .await
            .map_err(|err| ContractError::CallFailed(err.to_string()))
    }

    /// Raw logs emitted by the contract.
    ///
    /// Dropping the receiver is the exact unsubscribe; consumers decode
    /// with [`codec::decode_minted`](crate::codec::decode_minted).
    pub fn subscribe_events(&self) -> broadcast::Receiver<RawLog> {
        self.transport.subscribe_logs()
    }
}
