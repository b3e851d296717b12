//! The deferred queue.
//!
//! An ordered, time-indexed set of transactions awaiting delivery, ordered
//! by scheduled delivery time ascending and tie-broken by transaction id
//! ascending for determinism.
//!
//! Removal is committed as entries are yielded: once `pop_next_due` returns
//! an entry the queue no longer knows it, so a crash mid-delivery cannot
//! redeliver an already-popped entry from the queue itself. The executor is
//! responsible for exactly-once *effect*.

use crate::error::{ControllerError, Result};
use shared_types::{AccountName, TimePoint, Transaction, TransactionId};
use std::collections::{BTreeMap, HashMap};

/// A transaction parked for future delivery.
///
/// Exclusively owned by the queue from enqueue until successful delivery or
/// cancellation; the executor only borrows it for one delivery attempt.
#[derive(Debug, Clone)]
pub struct DeferredEntry {
    id: TransactionId,
    /// The wrapped transaction.
    pub transaction: Transaction,
    /// Origin sender (the contract account that generated the transaction,
    /// or the submitting authorizer for sender-requested delays).
    pub sender: AccountName,
    /// Scheduled delivery time.
    pub delivery_time: TimePoint,
    /// Completed delivery attempts.
    pub attempts: u32,
}

impl DeferredEntry {
    /// Wraps a transaction for delivery at `delivery_time`.
    pub fn new(sender: AccountName, transaction: Transaction, delivery_time: TimePoint) -> Self {
        let id = transaction.id();
        Self {
            id,
            transaction,
            sender,
            delivery_time,
            attempts: 0,
        }
    }

    /// The wrapped transaction's id (cached at construction).
    pub fn id(&self) -> TransactionId {
        self.id
    }
}

/// Time-indexed set of deferred transaction entries.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    by_time: BTreeMap<(TimePoint, TransactionId), DeferredEntry>,
    by_id: HashMap<TransactionId, TimePoint>,
}

impl DeferredQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry.
    ///
    /// # Errors
    /// - `DuplicateDeferredId` if an entry with the same transaction id is
    ///   already pending
    pub fn enqueue(&mut self, entry: DeferredEntry) -> Result<()> {
        let id = entry.id();
        if self.by_id.contains_key(&id) {
            return Err(ControllerError::DuplicateDeferredId(id));
        }
        self.by_id.insert(id, entry.delivery_time);
        self.by_time.insert((entry.delivery_time, id), entry);
        Ok(())
    }

    /// Removes and returns the earliest entry due at `now`, if any.
    ///
    /// Entries come out in queue order: delivery time ascending, transaction
    /// id ascending. The removal is committed before the entry is handed
    /// out.
    pub fn pop_next_due(&mut self, now: TimePoint) -> Option<DeferredEntry> {
        let key = *self.by_time.keys().next()?;
        if key.0 > now {
            return None;
        }
        let entry = self.by_time.remove(&key)?;
        self.by_id.remove(&entry.id());
        Some(entry)
    }

    /// Removes and returns, in queue order, every entry due at `now`.
    pub fn pop_due(&mut self, now: TimePoint) -> Vec<DeferredEntry> {
        let mut due = Vec::new();
        while let Some(entry) = self.pop_next_due(now) {
            due.push(entry);
        }
        due
    }

    /// Re-inserts an entry that failed delivery, armed for
    /// `new_delivery_time`, bumping its attempt counter.
    pub fn reschedule(&mut self, mut entry: DeferredEntry, new_delivery_time: TimePoint) -> Result<()> {
        entry.delivery_time = new_delivery_time;
        entry.attempts += 1;
        self.enqueue(entry)
    }

    /// Removes an entry if present; no-op otherwise. Returns whether an
    /// entry was removed.
    pub fn cancel(&mut self, id: &TransactionId) -> bool {
        match self.by_id.remove(id) {
            Some(delivery_time) => self.by_time.remove(&(delivery_time, *id)).is_some(),
            None => false,
        }
    }

    /// True if an entry with this id is pending.
    pub fn contains(&self, id: &TransactionId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.by_time.len()
    }

    /// True if no entry is pending.
    pub fn is_empty(&self) -> bool {
        self.by_time.is_empty()
    }

    /// Delivery time of the earliest pending entry.
    pub fn next_delivery_time(&self) -> Option<TimePoint> {
        self.by_time.keys().next().map(|(time, _)| *time)
    }
}
