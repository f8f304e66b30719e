//! Feedback loop from contract mint events into ownership resolution.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use contract::{ContractClient, codec};

use crate::ownership::OwnershipResolver;

/// Listens for the contract's mint-completion event and re-resolves
/// ownership when one lands for the session account.
///
/// A bridge is bound to exactly one client instance. When the client is
/// replaced (reconnection, network switch) the old bridge must be shut
/// down before a new one is bound, and teardown shuts it down outright,
/// so a stale handler can never fire against a defunct session. `Drop`
/// covers any remaining exit path.
pub struct EventBridge {
    listener: JoinHandle<()>,
}

impl EventBridge {
    /// Subscribe to the client's log stream and start the listener.
    pub fn bind(client: &Arc<ContractClient>, resolver: Arc<OwnershipResolver>) -> Self {
        let mut logs = client.subscribe_events();
        let account = client.account();

        let listener = tokio::spawn(async move {
            loop {
                match logs.recv().await {
                    Ok(log) => {
                        // Foreign and undecodable logs are not ours to handle.
                        let Some(event) = codec::decode_minted(&log) else {
                            continue;
                        };
                        if event.sender != account {
                            debug!("ignoring mint for {}", event.sender);
                            continue;
                        }

                        info!(
                            "observed mint of token {} for the session account",
                            event.token_id
                        );
                        if let Err(err) = resolver.resolve().await {
                            warn!("re-resolution after a mint event failed: {err}");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("mint event stream lagged, {skipped} logs skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { listener }
    }

    /// Stop listening; the exact undo of [`bind`](Self::bind).
    pub fn shutdown(self) {
        self.listener.abort();
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy_primitives::{Address, U256};
    use tokio::time::timeout;

    use contract::{CharacterMinted, ContractTransport, MockContractTransport};
    use wallet::{NetworkState, NetworkStatus, Session};

    use super::*;
    use crate::ownership::OwnershipState;

    const ACCOUNT: Address = Address::repeat_byte(0x55);

    fn bound_bridge(
        transport: &Arc<MockContractTransport>,
    ) -> (EventBridge, Arc<OwnershipResolver>) {
        let client = Arc::new(
            contract::ContractClient::connect(
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
        let bridge = EventBridge::bind(&client, Arc::clone(&resolver));
        (bridge, resolver)
    }

    fn minted_for(account: Address) -> CharacterMinted {
        CharacterMinted {
            sender: account,
            token_id: U256::from(9u64),
            character_index: 1,
        }
    }

    #[tokio::test]
    async fn a_matching_event_triggers_re_resolution() {
        let transport = Arc::new(MockContractTransport::with_default_roster());
        let (_bridge, resolver) = bound_bridge(&transport);
        let mut states = resolver.watch();

        // The contract now knows the account minted; only the event tells us.
        transport.set_owned(
            ACCOUNT,
            contract::CharacterRecord::new(1, "Sentinel", "QmSentinelPortrait", 200, 200, 25),
        );
        transport.emit_minted(&minted_for(ACCOUNT));

        timeout(Duration::from_secs(1), states.changed())
            .await
            .expect("bridge should resolve")
            .unwrap();
        assert_eq!(
            states.borrow().character().unwrap().character_index,
            1
        );
    }

    #[tokio::test]
    async fn a_foreign_event_is_ignored() {
        let transport = Arc::new(MockContractTransport::with_default_roster());
        let (_bridge, resolver) = bound_bridge(&transport);

        transport.emit_minted(&minted_for(Address::repeat_byte(0x99)));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(resolver.state(), OwnershipState::Unknown);
    }

    #[tokio::test]
    async fn shutdown_prevents_stale_handling() {
        let transport = Arc::new(MockContractTransport::with_default_roster());
        let (bridge, resolver) = bound_bridge(&transport);

        bridge.shutdown();
        transport.emit_minted(&minted_for(ACCOUNT));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(resolver.state(), OwnershipState::Unknown);
    }
}
