//! Authority model error types.

use shared_types::{AccountName, PermissionName};
use thiserror::Error;

/// All errors that can occur in the authority model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    /// No account with this name exists.
    #[error("unknown account: {0}")]
    UnknownAccount(AccountName),

    /// The account exists but has no permission with this name.
    #[error("unknown permission {permission} on account {account}")]
    UnknownPermission {
        account: AccountName,
        permission: PermissionName,
    },

    /// An account with this name already exists.
    #[error("account already exists: {0}")]
    DuplicateAccount(AccountName),

    /// The authority has an unreachable threshold or zero-weight entries.
    #[error("invalid authority for {account}@{permission}: threshold {threshold} unreachable with total weight {total_weight}")]
    InvalidAuthority {
        account: AccountName,
        permission: PermissionName,
        threshold: u32,
        total_weight: u32,
    },

    /// Delegation recursion exceeded the depth bound. Fatal: cyclic
    /// delegation can never be satisfied and is never retried.
    #[error("cyclic delegation resolving {account}@{permission}: depth limit {limit} exceeded")]
    CyclicDelegation {
        account: AccountName,
        permission: PermissionName,
        limit: u8,
    },
}
