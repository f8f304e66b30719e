//! The per-session store and its activation lifecycle.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use contract::{CharacterTemplate, ContractClient, ContractError, ContractTransport, MintReceipt};
use wallet::{NetworkGuard, NetworkState, ProviderGateway, Session, WalletConnector};

use crate::bridge::EventBridge;
use crate::error::Result;
use crate::mint::{MintCoordinator, MintStatus};
use crate::ownership::{OwnershipResolver, OwnershipState};

/// The contract-facing bundle that exists only while the session is
/// connected on the expected network.
///
/// Replaced wholesale on account or network changes; components never
/// keep calling through an instance built for a previous session.
struct ActiveContract {
    client: Arc<ContractClient>,
    resolver: Arc<OwnershipResolver>,
    coordinator: Arc<MintCoordinator>,
    bridge: EventBridge,
}

/// Everything the client knows for one wallet interaction window.
///
/// Owns the connector, the network guard, and (once both preconditions
/// hold) the active contract bundle. All mutation funnels through the
/// operations here; consumers read snapshots or watch channels.
pub struct GameSession {
    gateway: Arc<ProviderGateway>,
    connector: WalletConnector,
    guard: Arc<NetworkGuard>,
    transport: Arc<dyn ContractTransport>,
    contract_address: Address,
    active: RwLock<Option<ActiveContract>>,
}

impl GameSession {
    pub fn new(
        gateway: Arc<ProviderGateway>,
        transport: Arc<dyn ContractTransport>,
        contract_address: Address,
        expected_chain_id: u64,
    ) -> Arc<Self> {
        let connector = WalletConnector::new(Arc::clone(&gateway));
        Arc::new(Self {
            gateway,
            connector,
            guard: Arc::new(NetworkGuard::new(expected_chain_id)),
            transport,
            contract_address,
            active: RwLock::new(None),
        })
    }

    /// Bring the session up without prompting the user.
    ///
    /// Restores any previously authorized account, seeds the network
    /// guard from the provider's current chain, installs the
    /// network-change handler, and activates if both preconditions
    /// already hold. Without a provider this simply leaves the session
    /// disconnected.
    pub async fn start(self: &Arc<Self>) -> Result<Session> {
        let session = self.connector.restore_session().await?;

        if let Ok(provider) = self.gateway.detect() {
            if let Err(err) = self.guard.refresh(&provider).await {
                warn!("could not read the provider chain: {err}");
            }

            let weak = Arc::downgrade(self);
            self.gateway.on_network_changed(move |chain_id| {
                if let Some(session) = weak.upgrade() {
                    tokio::spawn(async move {
                        session.on_chain_changed(chain_id).await;
                    });
                }
            })?;
        }

        self.try_activate().await?;
        Ok(session)
    }

    /// Prompt the user for authorization, then activate if allowed.
    pub async fn connect(&self) -> Result<Address> {
        let address = self.connector.request_connection().await?;
        self.try_activate().await?;
        Ok(address)
    }

    async fn on_chain_changed(self: Arc<Self>, chain_id: u64) {
        let state = self.guard.observe(chain_id);
        if state.allowed() {
            if let Err(err) = self.try_activate().await {
                warn!("activation after a network switch failed: {err}");
            }
        } else {
            self.deactivate().await;
        }
    }

    /// Construct the contract bundle once the session is connected on the
    /// expected network. Idempotent for an unchanged account; a bundle
    /// built for a previous account is discarded first.
    ///
    /// Returns whether a bundle is active afterwards.
    pub async fn try_activate(&self) -> Result<bool> {
        let session = self.connector.session();
        let network = self.guard.state();

        if !(session.connected && network.allowed()) {
            debug!(
                "contract client not constructed: connected={}, network={:?}",
                session.connected, network.status
            );
            return Ok(false);
        }

        {
            let mut active = self.active.write().await;

            if let Some(current) = active.as_ref() {
                if Some(current.client.account()) == session.address {
                    return Ok(true);
                }
                info!("discarding contract client built for a previous account");
            }
            if let Some(stale) = active.take() {
                stale.bridge.shutdown();
            }

            let client = Arc::new(ContractClient::connect(
                Arc::clone(&self.transport),
                self.contract_address,
                &session,
                network,
            )?);
            let resolver = Arc::new(OwnershipResolver::new(Arc::clone(&client)));
            let coordinator = Arc::new(MintCoordinator::new(
                Arc::clone(&client),
                Arc::clone(&resolver),
            ));
            let bridge = EventBridge::bind(&client, Arc::clone(&resolver));

            *active = Some(ActiveContract {
                client,
                resolver,
                coordinator,
                bridge,
            });
        }

        // Client availability is the first resolution trigger.
        if let Some(resolver) = self.resolver().await {
            if let Err(err) = resolver.resolve().await {
                warn!("initial ownership resolution failed: {err}");
            }
        }

        Ok(true)
    }

    /// Drop the contract bundle and stop its event handling.
    pub async fn deactivate(&self) {
        if let Some(stale) = self.active.write().await.take() {
            info!("contract client discarded for a defunct session");
            stale.bridge.shutdown();
        }
    }

    /// Tear the session down: unsubscribe all listeners eagerly, drop the
    /// contract bundle, clear the session.
    pub async fn teardown(&self) {
        self.gateway.clear_network_handler();
        self.deactivate().await;
        self.connector.clear();
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.connector.session()
    }

    /// Subscribe to session transitions.
    pub fn watch_session(&self) -> tokio::sync::watch::Receiver<Session> {
        self.connector.watch()
    }

    /// Current network admission state.
    pub fn network(&self) -> NetworkState {
        self.guard.state()
    }

    /// Subscribe to network transitions.
    pub fn watch_network(&self) -> tokio::sync::watch::Receiver<NetworkState> {
        self.guard.watch()
    }

    pub async fn is_active(&self) -> bool {
        self.active.read().await.is_some()
    }

    pub async fn client(&self) -> Option<Arc<ContractClient>> {
        self.active.read().await.as_ref().map(|a| Arc::clone(&a.client))
    }

    pub async fn resolver(&self) -> Option<Arc<OwnershipResolver>> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|a| Arc::clone(&a.resolver))
    }

    pub async fn coordinator(&self) -> Option<Arc<MintCoordinator>> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|a| Arc::clone(&a.coordinator))
    }

    /// Current ownership view; `Unknown` while no client is active.
    pub async fn ownership(&self) -> OwnershipState {
        match self.resolver().await {
            Some(resolver) => resolver.state(),
            None => OwnershipState::Unknown,
        }
    }

    /// Current mint-request status; `Idle` while no client is active.
    pub async fn mint_status(&self) -> MintStatus {
        match self.coordinator().await {
            Some(coordinator) => coordinator.status(),
            None => MintStatus::Idle,
        }
    }

    /// Mintable archetypes from the contract.
    pub async fn character_templates(&self) -> Result<Vec<CharacterTemplate>> {
        let client = self
            .client()
            .await
            .ok_or(ContractError::ClientUnavailable)?;
        Ok(client.character_templates().await?)
    }

    /// Mint the archetype at `character_index` through the coordinator.
    pub async fn start_mint(&self, character_index: u64) -> Result<MintReceipt> {
        let coordinator = self
            .coordinator()
            .await
            .ok_or(ContractError::ClientUnavailable)?;
        coordinator.start_mint(character_index).await
    }
}
