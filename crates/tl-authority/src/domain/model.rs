//! The authority model aggregate.
//!
//! Owns every account's permission table and the per-permission pending
//! changes. The separation between *effective* and *pending* authority is
//! what the time-lock policy rests on: validation always consults the
//! authority that has been active for at least `delay` before the check.

use super::entities::{Authority, PendingAuthorityChange, Permission};
use super::errors::AuthorityError;
use shared_types::{AccountName, KeyId, PermissionName, TimePoint};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Default bound on delegation recursion.
pub const DEFAULT_DELEGATION_DEPTH: u8 = 6;

/// Per-account permission table plus pending changes.
#[derive(Debug, Clone, Default)]
struct AccountAuthorities {
    permissions: HashMap<PermissionName, Permission>,
    pending: HashMap<PermissionName, PendingAuthorityChange>,
}

/// Accounts, their named permissions, and the delay attached to each
/// permission change.
#[derive(Debug, Clone)]
pub struct AuthorityModel {
    accounts: HashMap<AccountName, AccountAuthorities>,
    max_delegation_depth: u8,
}

impl Default for AuthorityModel {
    fn default() -> Self {
        Self::new(DEFAULT_DELEGATION_DEPTH)
    }
}

impl AuthorityModel {
    /// Creates an empty model with the given delegation depth bound.
    pub fn new(max_delegation_depth: u8) -> Self {
        Self {
            accounts: HashMap::new(),
            max_delegation_depth,
        }
    }

    /// Installs a new account with the standard `owner`/`active` permission
    /// pair (`active`'s parent is `owner`).
    ///
    /// Account-creation bookkeeping itself (resource billing, initial
    /// balances) happens outside this model; only the resulting authority
    /// state lands here.
    ///
    /// # Errors
    /// - `DuplicateAccount` if the name is taken
    /// - `InvalidAuthority` if either authority is structurally invalid
    pub fn create_account(
        &mut self,
        name: impl Into<AccountName>,
        owner_authority: Authority,
        active_authority: Authority,
    ) -> Result<(), AuthorityError> {
        let name = name.into();
        if self.accounts.contains_key(&name) {
            return Err(AuthorityError::DuplicateAccount(name));
        }
        Self::validate(&name, &PermissionName::owner(), &owner_authority)?;
        Self::validate(&name, &PermissionName::active(), &active_authority)?;

        let mut permissions = HashMap::new();
        permissions.insert(
            PermissionName::owner(),
            Permission {
                name: PermissionName::owner(),
                parent: None,
                authority: owner_authority,
            },
        );
        permissions.insert(
            PermissionName::active(),
            Permission {
                name: PermissionName::active(),
                parent: Some(PermissionName::owner()),
                authority: active_authority,
            },
        );
        self.accounts.insert(
            name,
            AccountAuthorities {
                permissions,
                pending: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Returns true if an account with this name exists.
    pub fn has_account(&self, name: &AccountName) -> bool {
        self.accounts.contains_key(name)
    }

    /// Returns true if the account exists and has this permission.
    pub fn has_permission(&self, account: &AccountName, permission: &PermissionName) -> bool {
        self.accounts
            .get(account)
            .is_some_and(|entry| entry.permissions.contains_key(permission))
    }

    /// The authority that validates a check at `at_time`.
    ///
    /// A pending change whose activation time has arrived is already
    /// effective even if [`activate_due_changes`](Self::activate_due_changes)
    /// has not committed it yet; one still in the future is ignored.
    pub fn effective_authority(
        &self,
        account: &AccountName,
        permission: &PermissionName,
        at_time: TimePoint,
    ) -> Result<&Authority, AuthorityError> {
        let entry = self
            .accounts
            .get(account)
            .ok_or_else(|| AuthorityError::UnknownAccount(account.clone()))?;
        if let Some(pending) = entry.pending.get(permission) {
            if pending.activates_at <= at_time {
                return Ok(&pending.new_authority);
            }
        }
        entry
            .permissions
            .get(permission)
            .map(|p| &p.authority)
            .ok_or_else(|| AuthorityError::UnknownPermission {
                account: account.clone(),
                permission: permission.clone(),
            })
    }

    /// Records a permission update requested at `requested_at`.
    ///
    /// With `delay == 0` the new authority is committed immediately (and any
    /// pending change on the permission is dropped). Otherwise a pending
    /// change is recorded with activation at `requested_at + delay`,
    /// superseding any earlier pending change on the same permission.
    pub fn request_permission_update(
        &mut self,
        account: &AccountName,
        permission: &PermissionName,
        new_authority: Authority,
        delay: Duration,
        requested_at: TimePoint,
    ) -> Result<(), AuthorityError> {
        Self::validate(account, permission, &new_authority)?;
        let entry = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| AuthorityError::UnknownAccount(account.clone()))?;
        let existing = entry.permissions.get_mut(permission).ok_or_else(|| {
            AuthorityError::UnknownPermission {
                account: account.clone(),
                permission: permission.clone(),
            }
        })?;

        if delay.is_zero() {
            existing.authority = new_authority;
            entry.pending.remove(permission);
        } else {
            entry.pending.insert(
                permission.clone(),
                PendingAuthorityChange {
                    new_authority,
                    requested_at,
                    activates_at: requested_at + delay,
                },
            );
        }
        Ok(())
    }

    /// Commits every pending change whose activation time has arrived and
    /// removes its pending record. Returns the number of commits.
    ///
    /// Invoked before any authorization check at a new block time, keeping
    /// effective authority consistent with the block clock.
    pub fn activate_due_changes(&mut self, now: TimePoint) -> usize {
        let mut activated = 0;
        for entry in self.accounts.values_mut() {
            let due: Vec<PermissionName> = entry
                .pending
                .iter()
                .filter(|(_, change)| change.activates_at <= now)
                .map(|(name, _)| name.clone())
                .collect();
            for name in due {
                if let Some(change) = entry.pending.remove(&name) {
                    if let Some(permission) = entry.permissions.get_mut(&name) {
                        permission.authority = change.new_authority;
                        activated += 1;
                    }
                }
            }
        }
        activated
    }

    /// Activation time of the pending change on a permission, if any.
    ///
    /// The scheduler uses this to re-arm a soft-failed deferred transaction
    /// at the exact moment its blocking rotation completes.
    pub fn pending_activation(
        &self,
        account: &AccountName,
        permission: &PermissionName,
    ) -> Option<TimePoint> {
        self.accounts
            .get(account)?
            .pending
            .get(permission)
            .map(|change| change.activates_at)
    }

    /// Checks that the provided signer set meets the threshold of
    /// `effective_authority(account, permission, at_time)`.
    ///
    /// A check against a child permission is also satisfied by any ancestor
    /// permission's authority (`owner` satisfies `active`). Account weights
    /// recurse into the delegated account's permission, bounded by the
    /// delegation depth; exceeding the bound is a `CyclicDelegation` error,
    /// never an infinite loop.
    pub fn satisfies(
        &self,
        signers: &BTreeSet<KeyId>,
        account: &AccountName,
        permission: &PermissionName,
        at_time: TimePoint,
    ) -> Result<bool, AuthorityError> {
        self.check_level(signers, account, permission, at_time, 0)
    }

    fn check_level(
        &self,
        signers: &BTreeSet<KeyId>,
        account: &AccountName,
        permission: &PermissionName,
        at_time: TimePoint,
        depth: u8,
    ) -> Result<bool, AuthorityError> {
        if depth > self.max_delegation_depth {
            return Err(AuthorityError::CyclicDelegation {
                account: account.clone(),
                permission: permission.clone(),
                limit: self.max_delegation_depth,
            });
        }
        let entry = self
            .accounts
            .get(account)
            .ok_or_else(|| AuthorityError::UnknownAccount(account.clone()))?;

        // Walk the ancestor chain: the permission itself, then its parent,
        // up to the root.
        let mut current = Some(permission.clone());
        while let Some(name) = current {
            let perm = entry.permissions.get(&name).ok_or_else(|| {
                AuthorityError::UnknownPermission {
                    account: account.clone(),
                    permission: name.clone(),
                }
            })?;
            let authority = self.effective_authority(account, &name, at_time)?;
            if self.check_authority(signers, authority, at_time, depth)? {
                return Ok(true);
            }
            current = perm.parent.clone();
        }
        Ok(false)
    }

    fn check_authority(
        &self,
        signers: &BTreeSet<KeyId>,
        authority: &Authority,
        at_time: TimePoint,
        depth: u8,
    ) -> Result<bool, AuthorityError> {
        let mut weight: u32 = 0;
        for entry in &authority.keys {
            if signers.contains(&entry.key) {
                weight += u32::from(entry.weight);
                if weight >= authority.threshold {
                    return Ok(true);
                }
            }
        }
        for delegated in &authority.accounts {
            match self.check_level(
                signers,
                &delegated.actor,
                &delegated.permission,
                at_time,
                depth + 1,
            ) {
                Ok(true) => {
                    weight += u32::from(delegated.weight);
                    if weight >= authority.threshold {
                        return Ok(true);
                    }
                }
                Ok(false) => {}
                Err(err @ AuthorityError::CyclicDelegation { .. }) => return Err(err),
                // A dangling delegation (deleted account or permission)
                // contributes no weight but does not poison the check.
                Err(_) => {}
            }
        }
        Ok(weight >= authority.threshold)
    }

    fn validate(
        account: &AccountName,
        permission: &PermissionName,
        authority: &Authority,
    ) -> Result<(), AuthorityError> {
        if !authority.is_valid() {
            return Err(AuthorityError::InvalidAuthority {
                account: account.clone(),
                permission: permission.clone(),
                threshold: authority.threshold,
                total_weight: authority.total_weight(),
            });
        }
        Ok(())
    }
}
