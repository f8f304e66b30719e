//! Assembles a running game session from the pieces a front-end injects.

use std::sync::Arc;

use anyhow::{Context, Result};

use contract::ContractTransport;
use session::GameSession;
use wallet::{ProviderGateway, WalletProvider};

use crate::config::ClientConfig;

/// Builder that wires an injected wallet provider and contract transport
/// into a started [`GameSession`].
///
/// The provider is optional: a host without one still gets a session
/// that reports the missing provider through the normal flows. The
/// transport is not: there is no session to run without a contract.
pub struct SessionBuilder {
    config: ClientConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    transport: Option<Arc<dyn ContractTransport>>,
}

impl SessionBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            provider: None,
            transport: None,
        }
    }

    /// Wallet provider injected by the host environment.
    pub fn provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Transport carrying contract calls for this deployment.
    pub fn transport(mut self, transport: Arc<dyn ContractTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the session store and bring it up.
    pub async fn start(self) -> Result<Arc<GameSession>> {
        let transport = self
            .transport
            .context("a contract transport is required")?;

        tracing::info!(
            "client targeting contract {} on chain {}",
            self.config.contract_address,
            self.config.expected_chain_id
        );

        let gateway = Arc::new(ProviderGateway::new(self.provider));
        let game = GameSession::new(
            gateway,
            transport,
            self.config.contract_address,
            self.config.expected_chain_id,
        );

        game.start().await.context("session startup failed")?;
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use contract::MockContractTransport;
    use wallet::MockWalletProvider;

    use super::*;

    #[tokio::test]
    async fn a_transport_is_mandatory() {
        let result = SessionBuilder::new(ClientConfig::default()).start().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn wires_a_session_from_injected_pieces() {
        let provider = Arc::new(MockWalletProvider::new(4));
        provider.authorize(Address::repeat_byte(0x12));
        let transport = Arc::new(MockContractTransport::with_default_roster());

        let game = SessionBuilder::new(ClientConfig::default())
            .provider(provider)
            .transport(transport)
            .start()
            .await
            .unwrap();

        assert!(game.session().connected);
        assert!(game.network().allowed());
        assert!(game.is_active().await);
    }

    #[tokio::test]
    async fn starts_without_a_provider() {
        let transport = Arc::new(MockContractTransport::with_default_roster());

        let game = SessionBuilder::new(ClientConfig::default())
            .transport(transport)
            .start()
            .await
            .unwrap();

        assert!(!game.session().connected);
        assert!(!game.is_active().await);
    }
}
