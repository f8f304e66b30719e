//! Access to the wallet provider injected by the host environment.

use std::sync::{Arc, Mutex};

use alloy_primitives::Address;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::{Result, WalletError};

/// Faults reported by the provider itself.
///
/// These are translated into [`WalletError`](crate::WalletError) by the
/// connection flows; rejection of a prompt is an outcome, not an RPC fault.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("provider rpc fault: {0}")]
    Rpc(String),

    #[error("request rejected by the user")]
    Rejected,
}

/// Surface of a browser-resident wallet provider.
///
/// The provider holds the user's keys and performs all signing; this client
/// only asks it for accounts and network identity. `request_accounts` is the
/// sole prompting call and suspends until the user approves or rejects;
/// there is no timeout on that suspension.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the user has already authorized for this client. Never prompts.
    async fn authorized_accounts(&self) -> std::result::Result<Vec<Address>, ProviderError>;

    /// Prompt the user to authorize this client. Suspends until they act.
    async fn request_accounts(&self) -> std::result::Result<Vec<Address>, ProviderError>;

    /// Chain identifier the provider is currently pointed at.
    async fn chain_id(&self) -> std::result::Result<u64, ProviderError>;

    /// Stream of chain identifiers, one per provider-reported network switch.
    fn chain_changes(&self) -> broadcast::Receiver<u64>;
}

/// Holds the provider handle the host environment injected, if any.
///
/// The gateway is the single place that knows whether a provider exists.
/// It also owns the network-change watcher task so that handler
/// registration stays idempotent: re-registering replaces the previous
/// watcher instead of stacking a second one.
pub struct ProviderGateway {
    provider: Option<Arc<dyn WalletProvider>>,
    network_watcher: Mutex<Option<JoinHandle<()>>>,
}

impl ProviderGateway {
    /// Wrap whatever provider the host environment injected.
    pub fn new(injected: Option<Arc<dyn WalletProvider>>) -> Self {
        if injected.is_none() {
            tracing::debug!("no wallet provider injected into this environment");
        }
        Self {
            provider: injected,
            network_watcher: Mutex::new(None),
        }
    }

    /// Handle to the injected provider.
    pub fn detect(&self) -> Result<Arc<dyn WalletProvider>> {
        self.provider.clone().ok_or(WalletError::ProviderMissing)
    }

    pub fn is_present(&self) -> bool {
        self.provider.is_some()
    }

    /// Route network-change notifications into `handler`.
    ///
    /// Registration replaces any previously installed handler, so repeated
    /// calls never cause duplicate downstream work. The handler runs on a
    /// background task until replaced or cleared.
    pub fn on_network_changed<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let provider = self.detect()?;
        let mut changes = provider.chain_changes();

        let watcher = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(chain_id) => handler(chain_id),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("missed {skipped} network-change notifications");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut slot = self
            .network_watcher
            .lock()
            .expect("network watcher slot poisoned");
        if let Some(previous) = slot.replace(watcher) {
            previous.abort();
        }

        Ok(())
    }

    /// Remove the registered network-change handler, if any.
    ///
    /// The matching deregistration for [`on_network_changed`](Self::on_network_changed);
    /// teardown calls this eagerly so no handler outlives its session.
    pub fn clear_network_handler(&self) {
        let mut slot = self
            .network_watcher
            .lock()
            .expect("network watcher slot poisoned");
        if let Some(watcher) = slot.take() {
            watcher.abort();
        }
    }
}

impl Drop for ProviderGateway {
    fn drop(&mut self) {
        self.clear_network_handler();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::mock::MockWalletProvider;

    #[tokio::test]
    async fn detect_fails_without_injected_provider() {
        let gateway = ProviderGateway::new(None);
        assert!(!gateway.is_present());
        assert!(matches!(
            gateway.detect(),
            Err(WalletError::ProviderMissing)
        ));
    }

    #[tokio::test]
    async fn registering_without_provider_fails() {
        let gateway = ProviderGateway::new(None);
        let result = gateway.on_network_changed(|_| {});
        assert!(matches!(result, Err(WalletError::ProviderMissing)));
    }

    #[tokio::test]
    async fn re_registration_replaces_the_previous_handler() {
        let provider = Arc::new(MockWalletProvider::new(4));
        let gateway = ProviderGateway::new(Some(provider.clone()));

        let fired = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let fired = Arc::clone(&fired);
            gateway
                .on_network_changed(move |_| {
                    fired.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        provider.switch_chain(1);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // One switch, one registered handler, one invocation.
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cleared_handler_never_fires_again() {
        let provider = Arc::new(MockWalletProvider::new(4));
        let gateway = ProviderGateway::new(Some(provider.clone()));

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        gateway
            .on_network_changed(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        gateway.clear_network_handler();
        provider.switch_chain(1);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
