//! Account session ownership and the connect/restore flows.

use std::sync::Arc;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Result, WalletError};
use crate::provider::ProviderGateway;

/// Resolved account state for a single wallet interaction window.
///
/// Created on successful connection, cleared on disconnect or provider
/// loss. The connector owns the only mutable copy; everyone else reads
/// snapshots or watches transitions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub address: Option<Address>,
    pub connected: bool,
}

impl Session {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            connected: true,
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }
}

/// Obtains and restores the active account through the provider gateway.
pub struct WalletConnector {
    gateway: Arc<ProviderGateway>,
    session: watch::Sender<Session>,
}

impl WalletConnector {
    pub fn new(gateway: Arc<ProviderGateway>) -> Self {
        Self {
            gateway,
            session: watch::Sender::new(Session::disconnected()),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Subscribe to session transitions (connection established, cleared).
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Restore an already-authorized account without prompting the user.
    ///
    /// Absence of a provider, or of authorized accounts, yields a
    /// disconnected session; only provider faults are errors.
    pub async fn restore_session(&self) -> Result<Session> {
        let provider = match self.gateway.detect() {
            Ok(provider) => provider,
            Err(WalletError::ProviderMissing) => {
                debug!("no provider to restore a session from");
                return Ok(Session::disconnected());
            }
            Err(other) => return Err(other),
        };

        let accounts = provider
            .authorized_accounts()
            .await
            .map_err(WalletError::from)?;

        let session = match accounts.first() {
            Some(address) => {
                info!("restored authorized account {address}");
                Session::connected(*address)
            }
            None => {
                debug!("no authorized account found");
                Session::disconnected()
            }
        };

        self.session.send_replace(session.clone());
        Ok(session)
    }

    /// Prompt the user to authorize this client, suspending until they act.
    ///
    /// On approval the first authorized address becomes the session account.
    /// Failure leaves the session untouched.
    pub async fn request_connection(&self) -> Result<Address> {
        let provider = self.gateway.detect()?;

        let accounts = provider
            .request_accounts()
            .await
            .map_err(WalletError::from)?;

        let address = accounts.first().copied().ok_or_else(|| {
            WalletError::ConnectionError("provider approved but returned no accounts".into())
        })?;

        self.session.send_replace(Session::connected(address));
        info!("wallet connected as {address}");
        Ok(address)
    }

    /// Clear the session on disconnect or provider loss.
    pub fn clear(&self) {
        self.session.send_replace(Session::disconnected());
    }
}
