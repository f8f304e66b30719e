//! Mint-request lifecycle, one live request per session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use contract::{ContractClient, MintReceipt};

use crate::error::{Result, SessionError};
use crate::ownership::OwnershipResolver;

/// Lifecycle of a mint request.
///
/// Terminal states park back at `Idle`; the coordinator never dead-ends,
/// so a failed mint can always be retried without restarting the session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintStatus {
    #[default]
    Idle,
    /// The mint call is being issued.
    Submitting,
    /// Submitted; waiting for block inclusion.
    AwaitingConfirmation,
    /// Included on-chain; ownership is being re-resolved.
    Confirmed,
    /// The request failed for the given reason.
    Failed(String),
}

impl MintStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, MintStatus::Idle)
    }
}

/// Drives a single mint from submission through on-chain confirmation.
///
/// Duplicate submissions are refused by a state-machine guard rather
/// than a lock: claiming the `Idle` slot is an atomic check-and-set on
/// the status channel, and nothing holds it across a suspension point.
pub struct MintCoordinator {
    client: Arc<ContractClient>,
    resolver: Arc<OwnershipResolver>,
    status: watch::Sender<MintStatus>,
}

impl MintCoordinator {
    pub fn new(client: Arc<ContractClient>, resolver: Arc<OwnershipResolver>) -> Self {
        Self {
            client,
            resolver,
            status: watch::Sender::new(MintStatus::Idle),
        }
    }

    /// Current request status.
    pub fn status(&self) -> MintStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to request transitions.
    pub fn watch(&self) -> watch::Receiver<MintStatus> {
        self.status.subscribe()
    }

    /// Mint the archetype at `character_index` and drive the request to a
    /// terminal state.
    ///
    /// Fails with [`SessionError::MintAlreadyInProgress`] while another
    /// request is live, without touching the in-flight request. On
    /// confirmation the resolver re-observes ownership before the status
    /// parks back at `Idle`.
    pub async fn start_mint(&self, character_index: u64) -> Result<MintReceipt> {
        let claimed = self.status.send_if_modified(|status| {
            if status.is_idle() {
                *status = MintStatus::Submitting;
                true
            } else {
                false
            }
        });
        if !claimed {
            debug!("mint of character {character_index} refused, a request is already live");
            return Err(SessionError::MintAlreadyInProgress);
        }

        match self.drive(character_index).await {
            Ok(receipt) => {
                self.status.send_replace(MintStatus::Confirmed);
                if let Err(err) = self.resolver.resolve().await {
                    warn!("mint confirmed but ownership re-resolution failed: {err}");
                }
                self.status.send_replace(MintStatus::Idle);
                Ok(receipt)
            }
            Err(err) => {
                warn!("mint of character {character_index} failed: {err}");
                self.status.send_replace(MintStatus::Failed(err.to_string()));
                self.status.send_replace(MintStatus::Idle);
                Err(err)
            }
        }
    }

    async fn drive(&self, character_index: u64) -> Result<MintReceipt> {
        info!("minting character {character_index}");
        let pending = self.client.mint_character(character_index).await?;

        self.status.send_replace(MintStatus::AwaitingConfirmation);
        debug!("mint submitted as {}", pending.tx_id());

        let receipt = pending.wait().await?;
        info!(
            "mint {} confirmed, token {} minted",
            receipt.tx, receipt.token_id
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use contract::{ContractTransport, MockContractTransport};
    use wallet::{NetworkState, NetworkStatus, Session};

    use super::*;
    use crate::ownership::OwnershipState;

    const ACCOUNT: Address = Address::repeat_byte(0x44);

    fn coordinator_on(transport: &Arc<MockContractTransport>) -> MintCoordinator {
        let client = Arc::new(
            ContractClient::connect(
                Arc::clone(transport) as Arc<dyn ContractTransport>,
                Address::repeat_byte(0xf8),
                &Session::connected(ACCOUNT),
                NetworkState {
                    chain_id: Some(4),
                    status: NetworkStatus::Allowed,
                },
            )
            .unwrap(),
        );
        let resolver = Arc::new(OwnershipResolver::new(Arc::clone(&client)));
        MintCoordinator::new(client, resolver)
    }

    #[tokio::test]
    async fn confirmed_mint_resolves_ownership_and_parks_idle() {
        let transport = Arc::new(MockContractTransport::with_default_roster());
        let coordinator = coordinator_on(&transport);

        let receipt = coordinator.start_mint(2).await.unwrap();
        assert_eq!(receipt.character_index, 2);

        assert_eq!(coordinator.status(), MintStatus::Idle);
        let state = coordinator.resolver.state();
        assert_eq!(state.character().unwrap().character_index, 2);
    }

    #[tokio::test]
    async fn a_second_mint_is_refused_while_one_is_live() {
        let transport = Arc::new(MockContractTransport::with_default_roster());
        transport.hold_inclusion(true);
        let coordinator = Arc::new(coordinator_on(&transport));

        let first = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.start_mint(0).await })
        };

        // Let the first request reach its confirmation wait.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(coordinator.status(), MintStatus::AwaitingConfirmation);

        let second = coordinator.start_mint(1).await;
        assert!(matches!(second, Err(SessionError::MintAlreadyInProgress)));
        // The in-flight request is untouched.
        assert_eq!(coordinator.status(), MintStatus::AwaitingConfirmation);

        transport.confirm_held();
        let receipt = first.await.unwrap().unwrap();
        assert_eq!(receipt.character_index, 0);
        assert_eq!(coordinator.status(), MintStatus::Idle);
    }

    #[tokio::test]
    async fn submission_failure_resets_to_idle_and_permits_retry() {
        let transport = Arc::new(MockContractTransport::with_default_roster());
        transport.fail_submission(true);
        let coordinator = coordinator_on(&transport);

        let result = coordinator.start_mint(0).await;
        assert!(matches!(result, Err(SessionError::Contract(_))));
        assert_eq!(coordinator.status(), MintStatus::Idle);

        transport.fail_submission(false);
        let receipt = coordinator.start_mint(0).await.unwrap();
        assert_eq!(receipt.character_index, 0);
    }

    #[tokio::test]
    async fn post_inclusion_revert_resets_to_idle() {
        let transport = Arc::new(MockContractTransport::with_default_roster());
        transport.revert_execution(true);
        let coordinator = coordinator_on(&transport);

        let result = coordinator.start_mint(1).await;
        assert!(matches!(result, Err(SessionError::Contract(_))));
        assert_eq!(coordinator.status(), MintStatus::Idle);
        // A reverted mint never triggers resolution.
        assert_eq!(coordinator.resolver.state(), OwnershipState::Unknown);
    }
}
