//! Outbound Ports (Driven Ports / SPI)
//!
//! Capabilities the controller consumes: the contract sandbox that handles
//! actions, and the persistence layer for contract state. The core never
//! inspects or special-cases specific contracts.

use crate::domain::executor::ActionContext;
use shared_types::{AccountName, Action};
use std::collections::BTreeMap;
use thiserror::Error;

/// A business condition signaled by contract logic (e.g. insufficient
/// balance). Always a typed result, never an unrecoverable fault, so the
/// executor can classify it as rejection (fresh) or `soft_fail` (deferred).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AssertionError {
    /// Human-readable condition description.
    pub message: String,
}

impl AssertionError {
    /// Creates an assertion failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// External contract sandbox.
///
/// Dispatch must be deterministic, synchronous, and bounded (a WASM-style
/// sandbox with a step limit is assumed). All side effects flow through the
/// [`ActionContext`]: buffered state writes, deferred-transaction requests,
/// and permission updates, committed atomically by the executor only if the
/// whole transaction succeeds.
pub trait ActionDispatcher {
    /// Handles one action addressed to `action.scope`.
    fn dispatch(
        &self,
        action: &Action,
        ctx: &mut ActionContext<'_>,
    ) -> std::result::Result<(), AssertionError>;
}

/// A batch of contract state mutations, keyed by `(scope, key)`.
/// `None` deletes the entry.
pub type WriteSet = BTreeMap<(AccountName, Vec<u8>), Option<Vec<u8>>>;

/// Contract state persistence.
///
/// Read by action handlers through the [`ActionContext`] overlay; written
/// only by the executor's atomic commit.
pub trait StateStore {
    /// Reads the value stored under `(scope, key)`.
    fn get(&self, scope: &AccountName, key: &[u8]) -> Option<Vec<u8>>;

    /// Applies a committed write set.
    fn apply(&mut self, writes: WriteSet);
}
