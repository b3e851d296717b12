//! Authority entities: weighted threshold sets, permissions, pending changes.

use serde::{Deserialize, Serialize};
use shared_types::{AccountName, KeyId, PermissionName, TimePoint};

/// A signing key contributing `weight` toward an authority's threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWeight {
    /// Opaque key identifier recovered by the signing layer.
    pub key: KeyId,
    /// Weight contributed when the key has signed.
    pub weight: u16,
}

/// A delegated account permission contributing `weight` toward a threshold.
///
/// Satisfied when the named account's permission is itself satisfied by the
/// provided signers (resolved recursively, depth limited).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWeight {
    /// The delegated-to account.
    pub actor: AccountName,
    /// The delegated-to permission of that account.
    pub permission: PermissionName,
    /// Weight contributed when the delegation is satisfied.
    pub weight: u16,
}

/// A weighted threshold set of keys and delegated accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    /// Minimum total weight required to satisfy this authority.
    pub threshold: u32,
    /// Key entries.
    pub keys: Vec<KeyWeight>,
    /// Delegated account entries.
    pub accounts: Vec<AccountWeight>,
}

impl Authority {
    /// Single-key authority with threshold 1.
    pub fn key(key: KeyId) -> Self {
        Self {
            threshold: 1,
            keys: vec![KeyWeight { key, weight: 1 }],
            accounts: Vec::new(),
        }
    }

    /// Single-delegation authority with threshold 1.
    pub fn account(actor: impl Into<AccountName>, permission: impl Into<PermissionName>) -> Self {
        Self {
            threshold: 1,
            keys: Vec::new(),
            accounts: vec![AccountWeight {
                actor: actor.into(),
                permission: permission.into(),
                weight: 1,
            }],
        }
    }

    /// Sum of all entry weights.
    pub fn total_weight(&self) -> u32 {
        let keys: u32 = self.keys.iter().map(|k| u32::from(k.weight)).sum();
        let accounts: u32 = self.accounts.iter().map(|a| u32::from(a.weight)).sum();
        keys + accounts
    }

    /// A structurally valid authority has a reachable, non-zero threshold
    /// and no zero-weight entries.
    pub fn is_valid(&self) -> bool {
        self.threshold >= 1
            && self.total_weight() >= self.threshold
            && self.keys.iter().all(|k| k.weight > 0)
            && self.accounts.iter().all(|a| a.weight > 0)
    }
}

/// A named, delay-gated authority attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Permission name, unique within the account.
    pub name: PermissionName,
    /// Parent permission; a parent's authority satisfies any descendant.
    pub parent: Option<PermissionName>,
    /// The committed, effective authority.
    pub authority: Authority,
}

/// A requested permission update whose activation time has not yet arrived.
///
/// At most one exists per permission; a newer request supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorityChange {
    /// The authority that will become effective at activation.
    pub new_authority: Authority,
    /// Block time at which the update was requested.
    pub requested_at: TimePoint,
    /// `requested_at + delay`; committed once block time reaches this.
    pub activates_at: TimePoint,
}
