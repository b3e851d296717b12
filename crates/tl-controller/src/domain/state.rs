//! The explicitly owned ledger state handle.

use crate::domain::deferred::DeferredQueue;
use crate::domain::receipts::ReceiptStore;
use tl_authority::AuthorityModel;

/// All mutable ledger state: authority model, deferred queue, receipts.
///
/// Owned exclusively by the controller and passed by reference into the
/// executor and scheduler; there are no ambient singletons and no interior
/// locking, only the single-writer discipline.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// Accounts, permissions, and pending authority changes.
    pub authority: AuthorityModel,
    /// Transactions awaiting delivery.
    pub deferred: DeferredQueue,
    /// Outcome records keyed by transaction id.
    pub receipts: ReceiptStore,
}

impl LedgerState {
    /// Creates empty state with the given delegation depth bound.
    pub fn new(max_delegation_depth: u8) -> Self {
        Self {
            authority: AuthorityModel::new(max_delegation_depth),
            deferred: DeferredQueue::new(),
            receipts: ReceiptStore::new(),
        }
    }
}
