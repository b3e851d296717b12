//! Transaction receipts and the receipt store.
//!
//! A receipt is created the first time a transaction is attempted and its
//! status is mutated in place on every re-delivery: a deferred transaction's
//! id and receipt persist across retries, never spawning a new entity per
//! attempt.

use serde::{Deserialize, Serialize};
use shared_types::{ActionTrace, TransactionId};
use std::collections::HashMap;

/// Terminal or pending outcome of a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// All actions dispatched and committed.
    Executed,
    /// A recoverable failure; the entry stays scheduled for retry.
    SoftFail,
    /// A fatal failure; the entry is dropped.
    HardFail,
    /// Accepted but parked in the deferred queue by sender request.
    Delayed,
}

/// The persisted outcome record for a transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Content-derived transaction id.
    pub id: TransactionId,
    /// Status of the most recent delivery attempt.
    pub status: TransactionStatus,
    /// Traces of the actions dispatched by the successful attempt.
    pub action_traces: Vec<ActionTrace>,
}

impl TransactionReceipt {
    /// Creates a receipt without traces.
    pub fn new(id: TransactionId, status: TransactionStatus) -> Self {
        Self {
            id,
            status,
            action_traces: Vec::new(),
        }
    }

    /// Attaches action traces.
    pub fn with_traces(mut self, traces: Vec<ActionTrace>) -> Self {
        self.action_traces = traces;
        self
    }
}

/// Receipts keyed by transaction id.
#[derive(Debug, Clone, Default)]
pub struct ReceiptStore {
    by_id: HashMap<TransactionId, TransactionReceipt>,
}

impl ReceiptStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the receipt slot for its id.
    pub fn record(&mut self, receipt: TransactionReceipt) {
        self.by_id.insert(receipt.id, receipt);
    }

    /// Gets the receipt for a transaction id.
    pub fn get(&self, id: &TransactionId) -> Option<&TransactionReceipt> {
        self.by_id.get(id)
    }

    /// True if any attempt for this id has been recorded.
    pub fn contains(&self, id: &TransactionId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of recorded receipts.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True if no receipt has been recorded.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
