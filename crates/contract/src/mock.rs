//! Mock contract transport for testing without a chain.
//!
//! Simulates submission, inclusion, ownership, and log emission
//! in-memory. Inclusion is immediate by default; tests that need to
//! observe the in-flight window can hold inclusions back and release
//! them explicitly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot};

use crate::codec::{self, CharacterMinted, RawLog};
use crate::error::TransportError;
use crate::transport::{ContractTransport, MintReceipt, PendingMint, TxId};
use crate::types::CharacterRecord;

/// A submitted mint whose inclusion has not been simulated yet.
struct HeldMint {
    reply: oneshot::Sender<Result<MintReceipt, TransportError>>,
    minter: Address,
    character_index: u64,
    token_id: U256,
    tx: TxId,
}

/// In-memory contract transport.
pub struct MockContractTransport {
    templates: Vec<CharacterRecord>,
    owned: Mutex<HashMap<Address, CharacterRecord>>,
    logs: broadcast::Sender<RawLog>,
    held: Mutex<Vec<HeldMint>>,
    hold_inclusion: AtomicBool,
    fail_reads: AtomicBool,
    fail_submission: AtomicBool,
    revert_execution: AtomicBool,
    sequence: AtomicU64,
}

impl MockContractTransport {
    pub fn new(templates: Vec<CharacterRecord>) -> Self {
        Self {
            templates,
            owned: Mutex::new(HashMap::new()),
            logs: broadcast::channel(32).0,
            held: Mutex::new(Vec::new()),
            hold_inclusion: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_submission: AtomicBool::new(false),
            revert_execution: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
        }
    }

    /// Transport pre-seeded with the game's three archetypes.
    pub fn with_default_roster() -> Self {
        Self::new(vec![
            CharacterRecord::new(0, "Vanguard", "QmVanguardPortrait", 100, 100, 50),
            CharacterRecord::new(1, "Sentinel", "QmSentinelPortrait", 200, 200, 25),
            CharacterRecord::new(2, "Berserker", "QmBerserkerPortrait", 75, 75, 80),
        ])
    }

    /// Seed ownership directly, as if minted in an earlier session.
    pub fn set_owned(&self, owner: Address, record: CharacterRecord) {
        self.owned.lock().unwrap().insert(owner, record);
    }

    /// Keep submitted mints pending until [`confirm_held`](Self::confirm_held).
    pub fn hold_inclusion(&self, holding: bool) {
        self.hold_inclusion.store(holding, Ordering::SeqCst);
    }

    /// Simulate inclusion of every held mint, in submission order.
    pub fn confirm_held(&self) {
        let held: Vec<HeldMint> = self.held.lock().unwrap().drain(..).collect();
        for mint in held {
            self.include(mint);
        }
    }

    pub fn fail_reads(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
    }

    pub fn fail_submission(&self, failing: bool) {
        self.fail_submission.store(failing, Ordering::SeqCst);
    }

    pub fn revert_execution(&self, reverting: bool) {
        self.revert_execution.store(reverting, Ordering::SeqCst);
    }

    /// Publish a mint-completion log, as if another client minted.
    pub fn emit_minted(&self, event: &CharacterMinted) {
        let _ = self.logs.send(codec::encode_minted(event));
    }

    fn include(&self, mint: HeldMint) {
        if self.revert_execution.load(Ordering::SeqCst) {
            let _ = mint.reply.send(Err(TransportError::ExecutionReverted(
                "mint reverted in block".into(),
            )));
            return;
        }

        let template = &self.templates[mint.character_index as usize];
        let record = CharacterRecord {
            character_index: U256::from(mint.character_index),
            ..template.clone()
        };
        self.owned.lock().unwrap().insert(mint.minter, record);

        self.emit_minted(&CharacterMinted {
            sender: mint.minter,
            token_id: mint.token_id,
            character_index: mint.character_index,
        });

        let _ = mint.reply.send(Ok(MintReceipt {
            tx: mint.tx,
            token_id: mint.token_id,
            character_index: mint.character_index,
        }));
    }
}

#[async_trait]
impl ContractTransport for MockContractTransport {
    async fn default_characters(&self) -> Result<Vec<CharacterRecord>, TransportError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TransportError::Rpc("simulated read outage".into()));
        }
        Ok(self.templates.clone())
    }

    async fn character_of(&self, owner: Address) -> Result<CharacterRecord, TransportError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TransportError::Rpc("simulated read outage".into()));
        }
        Ok(self
            .owned
            .lock()
            .unwrap()
            .get(&owner)
            .cloned()
            .unwrap_or_else(CharacterRecord::vacant))
    }

    async fn submit_mint(
        &self,
        minter: Address,
        character_index: u64,
    ) -> Result<PendingMint, TransportError> {
        if self.fail_submission.load(Ordering::SeqCst) {
            return Err(TransportError::SubmissionReverted(
                "mint rejected at submission".into(),
            ));
        }
        if character_index as usize >= self.templates.len() {
            return Err(TransportError::SubmissionReverted(format!(
                "no character at index {character_index}"
            )));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let tx = TxId(B256::new(U256::from(sequence).to_be_bytes::<32>()));
        let (reply, included) = oneshot::channel();

        let mint = HeldMint {
            reply,
            minter,
            character_index,
            token_id: U256::from(sequence),
            tx: tx.clone(),
        };

        if self.hold_inclusion.load(Ordering::SeqCst) {
            self.held.lock().unwrap().push(mint);
        } else {
            self.include(mint);
        }

        Ok(PendingMint::new(tx, included))
    }

    fn subscribe_logs(&self) -> broadcast::Receiver<RawLog> {
        self.logs.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inclusion_records_ownership_and_emits_a_log() {
        let transport = MockContractTransport::with_default_roster();
        let minter = Address::repeat_byte(0x22);
        let mut logs = transport.subscribe_logs();

        let pending = transport.submit_mint(minter, 1).await.unwrap();
        let receipt = pending.wait().await.unwrap();
        assert_eq!(receipt.character_index, 1);

        let event = codec::decode_minted(&logs.recv().await.unwrap()).unwrap();
        assert_eq!(event.sender, minter);
        assert_eq!(event.token_id, receipt.token_id);
        assert_eq!(event.character_index, 1);

        let record = transport.character_of(minter).await.unwrap();
        assert_eq!(record.name, "Sentinel");
    }

    #[tokio::test]
    async fn held_mints_stay_pending_until_confirmed() {
        let transport = MockContractTransport::with_default_roster();
        let minter = Address::repeat_byte(0x22);
        transport.hold_inclusion(true);

        let pending = transport.submit_mint(minter, 0).await.unwrap();

        // Nothing owned while the transaction floats in the mempool.
        assert!(transport.character_of(minter).await.unwrap().is_vacant());

        transport.confirm_held();
        let receipt = pending.wait().await.unwrap();
        assert_eq!(receipt.character_index, 0);
        assert!(!transport.character_of(minter).await.unwrap().is_vacant());
    }
}
