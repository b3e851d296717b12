//! The ledger controller service.
//!
//! Single-writer façade over the authority model, deferred queue, receipt
//! store, block clock, and contract state. Fresh submissions, deferred
//! deliveries, block production, and time-locked authority activation all
//! run on one logical timeline owned by `&mut self`.

use crate::config::ChainConfig;
use crate::domain::clock::BlockClock;
use crate::domain::deferred::DeferredEntry;
use crate::domain::executor;
use crate::domain::receipts::{TransactionReceipt, TransactionStatus};
use crate::domain::state::LedgerState;
use crate::error::{ControllerError, Result};
use crate::ports::outbound::{ActionDispatcher, StateStore};
use shared_types::{
    AccountName, BlockHeader, PermissionName, TimePoint, Transaction, TransactionId,
};
use std::time::Duration;
use tl_authority::Authority;
use tracing::{debug, info, warn};

/// The ledger controller.
///
/// `D` is the contract sandbox, `S` the contract state backend. Both are
/// injected once at construction; the controller itself carries no
/// contract-specific logic.
pub struct LedgerController<D: ActionDispatcher, S: StateStore> {
    config: ChainConfig,
    clock: BlockClock,
    state: LedgerState,
    store: S,
    dispatcher: D,
    head: BlockHeader,
}

impl<D: ActionDispatcher, S: StateStore> LedgerController<D, S> {
    /// Creates a controller at genesis.
    pub fn new(config: ChainConfig, dispatcher: D, store: S) -> Self {
        let clock = BlockClock::new(config.genesis_time, config.block_interval);
        let state = LedgerState::new(config.max_delegation_depth);
        let head = BlockHeader {
            height: 0,
            timestamp: config.genesis_time,
            previous: Default::default(),
        };
        info!(genesis = %config.genesis_time, interval_ms = config.block_interval.as_millis() as u64, "ledger controller started");
        Self {
            config,
            clock,
            state,
            store,
            dispatcher,
            head,
        }
    }

    /// Current head block time.
    pub fn head_block_time(&self) -> TimePoint {
        self.clock.head_time()
    }

    /// Header of the most recently produced block.
    pub fn last_block_header(&self) -> &BlockHeader {
        &self.head
    }

    /// Read access to the authority model.
    pub fn authority(&self) -> &tl_authority::AuthorityModel {
        &self.state.authority
    }

    /// Reads committed contract state.
    pub fn state_value(&self, scope: &AccountName, key: &[u8]) -> Option<Vec<u8>> {
        self.store.get(scope, key)
    }

    /// Creates an account with its `owner` and `active` permissions.
    pub fn create_account(
        &mut self,
        name: impl Into<AccountName>,
        owner_authority: Authority,
        active_authority: Authority,
    ) -> Result<()> {
        let name = name.into();
        debug!(account = %name, "creating account");
        self.state
            .authority
            .create_account(name, owner_authority, active_authority)?;
        Ok(())
    }

    /// Requests a permission update outside any transaction, time-locked by
    /// `delay` from the current head block time.
    pub fn update_permission(
        &mut self,
        account: &AccountName,
        permission: &PermissionName,
        authority: Authority,
        delay: Duration,
    ) -> Result<()> {
        let now = self.clock.head_time();
        self.state.authority.activate_due_changes(now);
        self.state
            .authority
            .request_permission_update(account, permission, authority, delay, now)?;
        Ok(())
    }

    /// Applies a fresh transaction at the current head block time.
    ///
    /// A transaction carrying a sender-requested delay is not executed now:
    /// it is parked in the deferred queue and acknowledged with a `Delayed`
    /// receipt, and its authorization is checked at delivery time against
    /// whatever authority is effective then.
    ///
    /// An immediate transaction either commits fully (an `Executed` receipt
    /// is recorded and returned) or is rejected with an error and leaves no
    /// trace in history.
    pub fn push_transaction(&mut self, transaction: &Transaction) -> Result<TransactionReceipt> {
        let now = self.clock.head_time();
        if transaction.delay > Duration::ZERO {
            return self.push_delayed(transaction, now);
        }

        let traces = executor::apply(
            &mut self.state,
            &mut self.store,
            &self.dispatcher,
            transaction,
            now,
        )?;
        let receipt = TransactionReceipt::new(transaction.id(), TransactionStatus::Executed)
            .with_traces(traces);
        self.state.receipts.record(receipt.clone());
        debug!(id = %receipt.id, "transaction executed");
        Ok(receipt)
    }

    fn push_delayed(
        &mut self,
        transaction: &Transaction,
        now: TimePoint,
    ) -> Result<TransactionReceipt> {
        if transaction.actions.is_empty() {
            return Err(ControllerError::EmptyTransaction);
        }
        // The submitting authorizer is the origin sender; fall back to the
        // first action's scope for unauthorized test transactions.
        let first = &transaction.actions[0];
        let sender = first
            .authorization
            .first()
            .map(|level| level.actor.clone())
            .unwrap_or_else(|| first.scope.clone());
        let delivery_time = now + transaction.delay;
        self.state.deferred.enqueue(DeferredEntry::new(
            sender,
            transaction.clone(),
            delivery_time,
        ))?;
        let receipt = TransactionReceipt::new(transaction.id(), TransactionStatus::Delayed);
        self.state.receipts.record(receipt.clone());
        info!(id = %receipt.id, %delivery_time, "transaction delayed by sender request");
        Ok(receipt)
    }

    /// Delivers due deferred transactions at the current head block time and
    /// returns their receipts in delivery order.
    ///
    /// With `flush_all` the set of entries due now is snapshotted up front,
    /// so zero-delay follow-ups generated during this call wait for the next
    /// one. Without it at most one entry is delivered.
    pub fn push_deferred_transactions(&mut self, flush_all: bool) -> Vec<TransactionReceipt> {
        let now = self.clock.head_time();
        let batch = if flush_all {
            self.state.deferred.pop_due(now)
        } else {
            self.state.deferred.pop_next_due(now).into_iter().collect()
        };
        batch
            .into_iter()
            .map(|entry| self.deliver_entry(entry, now))
            .collect()
    }

    /// Produces the next block: advances the block clock one interval,
    /// links a new header, and gives the deferred queue one delivery
    /// opportunity.
    pub fn produce_block(&mut self) -> BlockHeader {
        let timestamp = self.clock.advance();
        let header = BlockHeader {
            height: self.head.height + 1,
            timestamp,
            previous: self.head.id(),
        };
        self.head = header.clone();
        debug!(height = header.height, %timestamp, "block produced");
        self.push_deferred_transactions(false);
        header
    }

    /// Gets the receipt for a transaction id.
    pub fn get_receipt(&self, id: &TransactionId) -> Option<&TransactionReceipt> {
        self.state.receipts.get(id)
    }

    /// True if a delivery attempt (or a `Delayed` acknowledgement) has been
    /// recorded for this id.
    ///
    /// A contract-generated deferred entry that is still queued and has
    /// never been attempted is invisible here: it gains a receipt only on
    /// its first delivery attempt.
    pub fn has_transaction(&self, id: &TransactionId) -> bool {
        self.state.receipts.contains(id)
    }

    /// Cancels a pending deferred transaction. Returns false if no entry
    /// with this id is pending.
    pub fn cancel_deferred_transaction(&mut self, id: &TransactionId) -> bool {
        let removed = self.state.deferred.cancel(id);
        if removed {
            info!(%id, "deferred transaction cancelled");
        }
        removed
    }

    /// Number of transactions awaiting delivery.
    pub fn pending_deferred(&self) -> usize {
        self.state.deferred.len()
    }

    fn deliver_entry(&mut self, entry: DeferredEntry, now: TimePoint) -> TransactionReceipt {
        let id = entry.id();
        let outcome = executor::apply(
            &mut self.state,
            &mut self.store,
            &self.dispatcher,
            &entry.transaction,
            now,
        );
        let receipt = match outcome {
            Ok(traces) => {
                debug!(%id, attempt = entry.attempts + 1, "deferred transaction executed");
                TransactionReceipt::new(id, TransactionStatus::Executed).with_traces(traces)
            }
            Err(error) if error.is_retryable() && !self.retries_exhausted(&entry) => {
                let retry_time = self.retry_time(&entry.transaction, now);
                warn!(%id, %error, %retry_time, "deferred transaction soft-failed");
                // The id was just removed and a soft failure commits
                // nothing, so re-arming cannot collide. If that invariant
                // ever breaks the entry must not vanish with a receipt that
                // still promises a retry.
                match self.state.deferred.reschedule(entry, retry_time) {
                    Ok(()) => TransactionReceipt::new(id, TransactionStatus::SoftFail),
                    Err(conflict) => {
                        warn!(%id, %conflict, "could not re-arm soft-failed transaction");
                        TransactionReceipt::new(id, TransactionStatus::HardFail)
                    }
                }
            }
            Err(error) => {
                warn!(%id, %error, "deferred transaction hard-failed");
                TransactionReceipt::new(id, TransactionStatus::HardFail)
            }
        };
        self.state.receipts.record(receipt.clone());
        receipt
    }

    fn retries_exhausted(&self, entry: &DeferredEntry) -> bool {
        self.config
            .max_deferred_retries
            .is_some_and(|limit| entry.attempts >= limit)
    }

    /// Picks when to retry a soft-failed entry: at the earliest pending
    /// authority activation among its declared authorizers if one is still
    /// in the future, otherwise at the next block.
    fn retry_time(&self, transaction: &Transaction, now: TimePoint) -> TimePoint {
        let next_activation = transaction
            .actions
            .iter()
            .flat_map(|action| &action.authorization)
            .filter_map(|level| {
                self.state
                    .authority
                    .pending_activation(&level.actor, &level.permission)
            })
            .filter(|time| *time > now)
            .min();
        next_activation.unwrap_or(now + self.clock.interval())
    }
}
