//! Virtual mempool
//!
//! Orders, includes, executes, and confirms virtual transactions against
//! the matching engine. Inclusion within a block is a strict total order:
//! effective gas descending, then earliest submission time, then arrival
//! order. Confirmation is probabilistic per block, with a forced floor that
//! prevents stalls when the probability is low or zero.

use std::collections::HashMap;

use determinism::SimRng;
use matching_engine::MatchingEngine;
use tokio::sync::{broadcast, oneshot};
use types::{Command, TxId};

use crate::transaction::{CommandOutcome, TxStatus, VirtualTransaction};

/// Extra blocks past `required_confirmations` after which confirmation is
/// forced regardless of the probability draw.
pub const FORCED_CONFIRMATION_EXTRA_BLOCKS: u64 = 5;

/// Mempool parameters.
#[derive(Debug, Clone)]
pub struct MempoolConfig {
    pub block_interval_ms: u64,
    pub max_transactions_per_block: usize,
    pub default_confirmations: u32,
    pub confirmation_probability_per_block: f64,
    pub seed: u64,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            block_interval_ms: 200,
            max_transactions_per_block: 10,
            default_confirmations: 1,
            confirmation_probability_per_block: 0.9,
            seed: 0,
        }
    }
}

/// Handle returned on submission. The receiver resolves with a transaction
/// snapshot on confirmation, or an error message on execution failure.
/// Dropping it loses only the notification; the transaction still
/// progresses through the state machine.
#[derive(Debug)]
pub struct SubmitHandle {
    pub tx_id: TxId,
    pub confirmed: oneshot::Receiver<Result<VirtualTransaction, String>>,
}

/// What one block tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReport {
    pub block_number: u64,
    pub included: Vec<TxId>,
    pub confirmed: Vec<TxId>,
    pub failed: Vec<TxId>,
}

/// The virtual mempool. The engine is borrowed per tick for execution; all
/// state mutates on the caller's single logical thread.
pub struct VirtualMempool {
    config: MempoolConfig,
    rng: SimRng,
    transactions: HashMap<TxId, VirtualTransaction>,
    /// Arrival order; drives `list` and deterministic iteration.
    submission_order: Vec<TxId>,
    waiters: HashMap<TxId, oneshot::Sender<Result<VirtualTransaction, String>>>,
    updates: broadcast::Sender<VirtualTransaction>,
    block_number: u64,
    next_submission_index: u64,
}

impl VirtualMempool {
    pub fn new(config: MempoolConfig) -> Self {
        let rng = SimRng::new(config.seed).derive("mempool:confirmations");
        let (updates, _) = broadcast::channel(1024);
        Self {
            config,
            rng,
            transactions: HashMap::new(),
            submission_order: Vec::new(),
            waiters: HashMap::new(),
            updates,
            block_number: 0,
            next_submission_index: 0,
        }
    }

    pub fn config(&self) -> &MempoolConfig {
        &self.config
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Observe every status transition as a snapshot stream.
    pub fn subscribe_updates(&self) -> broadcast::Receiver<VirtualTransaction> {
        self.updates.subscribe()
    }

    // ── Submit ──────────────────────────────────────────────────────

    /// Enqueue a payload with its gas bid. Returns a handle whose future
    /// resolves when the transaction confirms or fails.
    pub fn submit(
        &mut self,
        payload: Command,
        gas_price: u128,
        max_priority_fee_per_gas: u128,
        confirmations: Option<u32>,
        now_ms: i64,
    ) -> SubmitHandle {
        let tx_id = TxId::generate();
        let tx = VirtualTransaction {
            tx_id: tx_id.clone(),
            status: TxStatus::Pending,
            submitted_at_ms: now_ms,
            included_block_number: None,
            confirmed_block_number: None,
            gas_price,
            max_priority_fee_per_gas,
            required_confirmations: confirmations
                .unwrap_or(self.config.default_confirmations),
            payload,
            result: None,
            error: None,
            submission_index: self.next_submission_index,
        };
        self.next_submission_index += 1;

        let (sender, receiver) = oneshot::channel();
        self.waiters.insert(tx_id.clone(), sender);
        self.publish(&tx);
        self.transactions.insert(tx_id.clone(), tx);
        self.submission_order.push(tx_id.clone());

        tracing::debug!(%tx_id, gas_price, "virtual tx submitted");
        SubmitHandle {
            tx_id,
            confirmed: receiver,
        }
    }

    // ── Tick ────────────────────────────────────────────────────────

    /// Advance one virtual block: include by effective gas, execute each
    /// included payload against the engine, then sweep included
    /// transactions for confirmation.
    pub fn tick(&mut self, engine: &mut MatchingEngine, now_ms: i64) -> BlockReport {
        self.block_number += 1;
        let block_number = self.block_number;

        let included = self.include_phase(engine, now_ms, block_number);
        let failed = included
            .iter()
            .filter(|id| {
                self.transactions
                    .get(*id)
                    .map(|tx| tx.status == TxStatus::Failed)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        let confirmed = self.confirm_phase(block_number);

        tracing::debug!(
            block_number,
            included = included.len(),
            confirmed = confirmed.len(),
            "virtual block produced"
        );
        BlockReport {
            block_number,
            included,
            confirmed,
            failed,
        }
    }

    fn include_phase(
        &mut self,
        engine: &mut MatchingEngine,
        now_ms: i64,
        block_number: u64,
    ) -> Vec<TxId> {
        let mut pending: Vec<TxId> = self
            .submission_order
            .iter()
            .filter(|id| {
                self.transactions
                    .get(*id)
                    .map(|tx| tx.status == TxStatus::Pending)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        // Strict total order: effective gas desc, submission time asc,
        // arrival index asc.
        pending.sort_by(|a, b| {
            let ta = &self.transactions[a];
            let tb = &self.transactions[b];
            tb.effective_gas()
                .cmp(&ta.effective_gas())
                .then(ta.submitted_at_ms.cmp(&tb.submitted_at_ms))
                .then(ta.submission_index.cmp(&tb.submission_index))
        });
        pending.truncate(self.config.max_transactions_per_block);

        for tx_id in &pending {
            let payload = {
                let Some(tx) = self.transactions.get_mut(tx_id) else {
                    continue;
                };
                tx.status = TxStatus::Included;
                tx.included_block_number = Some(block_number);
                tx.payload.clone()
            };

            let execution = match payload {
                Command::SubmitOrder(cmd) => engine
                    .submit_order(cmd.request, now_ms)
                    .map(CommandOutcome::Submit)
                    .map_err(|e| e.to_string()),
                Command::CancelOrder(cmd) => Ok(CommandOutcome::Cancel(engine.cancel_order(
                    &cmd.order_id,
                    cmd.user_id.as_deref(),
                    cmd.symbol.as_ref(),
                    now_ms,
                ))),
            };

            match execution {
                Ok(outcome) => {
                    if let Some(tx) = self.transactions.get_mut(tx_id) {
                        tx.result = Some(outcome);
                    }
                    self.publish_by_id(tx_id);
                }
                Err(message) => {
                    if let Some(tx) = self.transactions.get_mut(tx_id) {
                        tx.status = TxStatus::Failed;
                        tx.error = Some(message.clone());
                    }
                    if let Some(waiter) = self.waiters.remove(tx_id) {
                        let _ = waiter.send(Err(message));
                    }
                    self.publish_by_id(tx_id);
                }
            }
        }
        pending
    }

    fn confirm_phase(&mut self, block_number: u64) -> Vec<TxId> {
        let mut confirmed = Vec::new();
        let candidates: Vec<TxId> = self
            .submission_order
            .iter()
            .filter(|id| {
                self.transactions
                    .get(*id)
                    .map(|tx| tx.status == TxStatus::Included)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        for tx_id in candidates {
            let (elapsed, required) = {
                let Some(tx) = self.transactions.get(&tx_id) else {
                    continue;
                };
                let Some(included) = tx.included_block_number else {
                    continue;
                };
                (
                    block_number - included + 1,
                    tx.required_confirmations as u64,
                )
            };
            if elapsed < required {
                continue;
            }
            let draw = self.rng.next_f64();
            let forced = elapsed >= required + FORCED_CONFIRMATION_EXTRA_BLOCKS;
            if draw < self.config.confirmation_probability_per_block || forced {
                if let Some(tx) = self.transactions.get_mut(&tx_id) {
                    tx.status = TxStatus::Confirmed;
                    tx.confirmed_block_number = Some(block_number);
                }
                if let Some(waiter) = self.waiters.remove(&tx_id) {
                    if let Some(tx) = self.transactions.get(&tx_id) {
                        let _ = waiter.send(Ok(tx.clone()));
                    }
                }
                self.publish_by_id(&tx_id);
                confirmed.push(tx_id);
            }
        }
        confirmed
    }

    // ── Read surface ────────────────────────────────────────────────

    pub fn get(&self, tx_id: &TxId) -> Option<VirtualTransaction> {
        self.transactions.get(tx_id).cloned()
    }

    /// Newest submitted first, capped at `limit`.
    pub fn list(&self, limit: usize) -> Vec<VirtualTransaction> {
        self.submission_order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| self.transactions.get(id).cloned())
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.transactions
            .values()
            .filter(|tx| tx.status == TxStatus::Pending)
            .count()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn publish(&self, tx: &VirtualTransaction) {
        let _ = self.updates.send(tx.clone());
    }

    fn publish_by_id(&self, tx_id: &TxId) {
        if let Some(tx) = self.transactions.get(tx_id) {
            self.publish(tx);
        }
    }
}
