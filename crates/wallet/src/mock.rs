//! Mock wallet provider for testing without a browser environment.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use alloy_primitives::Address;
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::provider::{ProviderError, WalletProvider};

/// What the next authorization prompt should do.
#[derive(Clone, Debug)]
enum GrantOutcome {
    Approve(Address),
    Reject,
}

/// In-memory provider with scripted prompt outcomes.
///
/// Defaults to rejecting prompts; tests opt into approval explicitly.
pub struct MockWalletProvider {
    authorized: Mutex<Vec<Address>>,
    next_grant: Mutex<GrantOutcome>,
    chain_id: Mutex<u64>,
    chain_tx: broadcast::Sender<u64>,
    fail_rpc: AtomicBool,
}

impl MockWalletProvider {
    pub fn new(chain_id: u64) -> Self {
        Self {
            authorized: Mutex::new(Vec::new()),
            next_grant: Mutex::new(GrantOutcome::Reject),
            chain_id: Mutex::new(chain_id),
            chain_tx: broadcast::channel(16).0,
            fail_rpc: AtomicBool::new(false),
        }
    }

    /// Pre-authorize an account, as if granted in an earlier session.
    pub fn authorize(&self, address: Address) {
        self.authorized.lock().unwrap().push(address);
    }

    /// Script the next prompt to approve with `address`.
    pub fn approve_next(&self, address: Address) {
        *self.next_grant.lock().unwrap() = GrantOutcome::Approve(address);
    }

    /// Script the next prompt to be rejected.
    pub fn reject_next(&self) {
        *self.next_grant.lock().unwrap() = GrantOutcome::Reject;
    }

    /// Point the provider at another chain and notify subscribers.
    pub fn switch_chain(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
        let _ = self.chain_tx.send(chain_id);
    }

    /// Make every provider call fail with an RPC fault.
    pub fn set_rpc_failures(&self, failing: bool) {
        self.fail_rpc.store(failing, Ordering::SeqCst);
    }

    fn check_rpc(&self) -> Result<(), ProviderError> {
        if self.fail_rpc.load(Ordering::SeqCst) {
            Err(ProviderError::Rpc("simulated rpc outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn authorized_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.check_rpc()?;
        Ok(self.authorized.lock().unwrap().clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.check_rpc()?;
        let outcome = self.next_grant.lock().unwrap().clone();
        match outcome {
            GrantOutcome::Approve(address) => {
                self.authorized.lock().unwrap().push(address);
                Ok(vec![address])
            }
            GrantOutcome::Reject => Err(ProviderError::Rejected),
        }
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        self.check_rpc()?;
        Ok(*self.chain_id.lock().unwrap())
    }

    fn chain_changes(&self) -> broadcast::Receiver<u64> {
        self.chain_tx.subscribe()
    }
}
