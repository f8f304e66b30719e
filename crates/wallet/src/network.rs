//! Network admission for the contract deployment.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Result, WalletError};
use crate::provider::WalletProvider;

/// Admission decision derived from the provider's reported chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NetworkStatus {
    /// No chain report has been observed yet.
    #[default]
    Unknown,
    /// The provider points at the expected chain.
    Allowed,
    /// The provider points elsewhere. Sticky until a matching report
    /// arrives; nothing else clears it.
    Blocked,
}

/// Last observed chain and the admission decision derived from it.
///
/// Only the guard mutates this; `allowed` is always derived, never set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkState {
    pub chain_id: Option<u64>,
    pub status: NetworkStatus,
}

impl NetworkState {
    pub fn allowed(&self) -> bool {
        self.status == NetworkStatus::Allowed
    }
}

/// Compares provider-reported chains against the one the contract is
/// deployed on.
///
/// Runs independently of wallet connection: a wrong network blocks
/// progress even for an already-connected wallet.
pub struct NetworkGuard {
    expected_chain_id: u64,
    state: watch::Sender<NetworkState>,
}

impl NetworkGuard {
    pub fn new(expected_chain_id: u64) -> Self {
        Self {
            expected_chain_id,
            state: watch::Sender::new(NetworkState::default()),
        }
    }

    pub fn expected_chain_id(&self) -> u64 {
        self.expected_chain_id
    }

    /// Current admission state.
    pub fn state(&self) -> NetworkState {
        *self.state.borrow()
    }

    /// Subscribe to admission transitions.
    pub fn watch(&self) -> watch::Receiver<NetworkState> {
        self.state.subscribe()
    }

    /// Fold a provider-reported chain id into the admission state.
    pub fn observe(&self, chain_id: u64) -> NetworkState {
        let status = if chain_id == self.expected_chain_id {
            NetworkStatus::Allowed
        } else {
            warn!(
                "provider reports chain {chain_id}, contract is deployed on {}",
                self.expected_chain_id
            );
            NetworkStatus::Blocked
        };

        let next = NetworkState {
            chain_id: Some(chain_id),
            status,
        };
        self.state.send_replace(next);
        debug!("network state is now {next:?}");
        next
    }

    /// Seed the state machine from the provider's current chain.
    pub async fn refresh(&self, provider: &Arc<dyn WalletProvider>) -> Result<NetworkState> {
        let chain_id = provider
            .chain_id()
            .await
            .map_err(WalletError::from)?;
        Ok(self.observe(chain_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWalletProvider;

    #[test]
    fn starts_unknown() {
        let guard = NetworkGuard::new(4);
        assert_eq!(guard.state().status, NetworkStatus::Unknown);
        assert!(!guard.state().allowed());
    }

    #[test]
    fn any_unexpected_chain_blocks() {
        let guard = NetworkGuard::new(4);
        for chain_id in [0, 1, 3, 5, 137, u64::MAX] {
            let state = guard.observe(chain_id);
            assert_eq!(state.status, NetworkStatus::Blocked);
            assert!(!state.allowed());
        }
    }

    #[test]
    fn blocked_is_sticky_until_a_matching_report() {
        let guard = NetworkGuard::new(4);

        guard.observe(1);
        assert_eq!(guard.state().status, NetworkStatus::Blocked);

        // Still blocked after more mismatches.
        guard.observe(5);
        assert_eq!(guard.state().status, NetworkStatus::Blocked);

        // Only the expected chain clears it.
        let state = guard.observe(4);
        assert_eq!(state.status, NetworkStatus::Allowed);
        assert_eq!(state.chain_id, Some(4));
    }

    #[tokio::test]
    async fn refresh_reads_the_provider_chain() {
        let provider: Arc<dyn WalletProvider> = Arc::new(MockWalletProvider::new(4));
        let guard = NetworkGuard::new(4);

        let state = guard.refresh(&provider).await.unwrap();
        assert!(state.allowed());
    }

    #[tokio::test]
    async fn refresh_surfaces_provider_faults() {
        let mock = Arc::new(MockWalletProvider::new(4));
        mock.set_rpc_failures(true);
        let provider: Arc<dyn WalletProvider> = mock;
        let guard = NetworkGuard::new(4);

        let result = guard.refresh(&provider).await;
        assert!(matches!(result, Err(WalletError::ConnectionError(_))));
        // A failed read leaves the state machine untouched.
        assert_eq!(guard.state().status, NetworkStatus::Unknown);
    }
}
