//! Re-derivation of on-chain character ownership.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use contract::{CharacterNft, ContractClient};

use crate::error::{Result, SessionError};

/// Client-side view of what the session account holds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipState {
    /// No resolution attempt has completed yet.
    #[default]
    Unknown,
    /// The wallet holds no character.
    NotOwned,
    /// The wallet holds this character.
    Owned(CharacterNft),
    /// The last attempt failed; retried on the next trigger.
    Unresolved(String),
}

impl OwnershipState {
    pub fn character(&self) -> Option<&CharacterNft> {
        match self {
            OwnershipState::Owned(nft) => Some(nft),
            _ => None,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, OwnershipState::Owned(_))
    }
}

/// Queries the contract for the session account's character.
///
/// `resolve` runs on three triggers: initial client availability, a
/// completed mint confirmation, and an observed mint event for the
/// active account. It is idempotent: repeated invocations converge on
/// the same view and publish only actual changes.
pub struct OwnershipResolver {
    client: Arc<ContractClient>,
    state: watch::Sender<OwnershipState>,
}

impl OwnershipResolver {
    pub fn new(client: Arc<ContractClient>) -> Self {
        Self {
            client,
            state: watch::Sender::new(OwnershipState::Unknown),
        }
    }

    /// Current ownership view.
    pub fn state(&self) -> OwnershipState {
        self.state.borrow().clone()
    }

    /// Subscribe to ownership transitions.
    pub fn watch(&self) -> watch::Receiver<OwnershipState> {
        self.state.subscribe()
    }

    /// Re-derive ownership from the contract.
    ///
    /// Failures are both returned and parked as [`OwnershipState::Unresolved`]
    /// so consumers that only watch the state still see them.
    pub async fn resolve(&self) -> Result<OwnershipState> {
        let next = match self.client.owned_character().await {
            Ok(Some(nft)) => {
                info!(
                    "account {} holds {} (archetype {})",
                    self.client.account(),
                    nft.name,
                    nft.character_index
                );
                OwnershipState::Owned(nft)
            }
            Ok(None) => {
                debug!("account {} holds no character", self.client.account());
                OwnershipState::NotOwned
            }
            Err(err) => {
                let reason = err.to_string();
                self.publish(OwnershipState::Unresolved(reason.clone()));
                return Err(SessionError::Resolution(reason));
            }
        };

        self.publish(next.clone());
        Ok(next)
    }

    fn publish(&self, next: OwnershipState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}
