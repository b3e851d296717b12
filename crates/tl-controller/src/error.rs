//! Error types for the ledger controller.

use shared_types::{AccountName, PermissionName, TransactionId};
use thiserror::Error;
use tl_authority::AuthorityError;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors that can occur while applying or scheduling transactions.
///
/// For a fresh submission every variant is a caller-visible rejection; for a
/// deferred delivery the scheduler recovers them into a `soft_fail` or
/// `hard_fail` receipt instead. No failure path is silently swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Authority model failure (unknown account, cyclic delegation, ...).
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// Declared authorization pairs do not satisfy the effective authority.
    #[error("authorization failure: {actor}@{permission} not satisfied")]
    AuthorizationFailure {
        actor: AccountName,
        permission: PermissionName,
    },

    /// A contract handler signaled an invalid business condition.
    #[error("assertion failure in {receiver}: {message}")]
    AssertionFailure {
        receiver: AccountName,
        message: String,
    },

    /// A deferred transaction with this id is already pending. Idempotent
    /// scheduling is the caller's responsibility; this is a contract or
    /// protocol bug surfaced synchronously.
    #[error("duplicate deferred transaction id: {0}")]
    DuplicateDeferredId(TransactionId),

    /// The transaction carries no actions.
    #[error("transaction has no actions")]
    EmptyTransaction,
}

impl ControllerError {
    /// True for failures a deferred re-delivery may recover from by waiting
    /// (authorization mid-rotation, business assertion). Everything else is
    /// fatal to the entry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ControllerError::AuthorizationFailure { .. }
                | ControllerError::AssertionFailure { .. }
        )
    }
}
