//! The transaction executor.
//!
//! Validates authorization against the authority model, dispatches actions
//! through the external sandbox, and commits the buffered effects
//! atomically. Nothing a handler does becomes visible unless every action
//! of the transaction succeeds: contract writes, deferred-transaction
//! requests, cancellations, and permission updates are all staged in the
//! [`ActionContext`] and applied in one commit step.

use crate::domain::deferred::DeferredEntry;
use crate::domain::state::LedgerState;
use crate::error::{ControllerError, Result};
use crate::ports::outbound::{ActionDispatcher, StateStore, WriteSet};
use shared_types::{AccountName, ActionTrace, KeyId, PermissionName, TimePoint, Transaction, TransactionId};
use std::collections::BTreeSet;
use std::time::Duration;
use tl_authority::{Authority, AuthorityError};
use tracing::debug;

/// A contract's request to schedule a follow-up transaction.
#[derive(Debug, Clone)]
pub struct DeferredRequest {
    /// The contract account that generated the request.
    pub sender: AccountName,
    /// The transaction to deliver later.
    pub transaction: Transaction,
    /// Requested delay from the current block time. Zero means the next
    /// delivery opportunity.
    pub delay: Duration,
}

/// A contract's request to update a permission's authority.
#[derive(Debug, Clone)]
struct PermissionUpdate {
    account: AccountName,
    permission: PermissionName,
    authority: Authority,
    delay: Duration,
}

/// Everything a transaction staged during dispatch, extracted from the
/// context for the commit step.
struct TransactionEffects {
    writes: WriteSet,
    deferred: Vec<DeferredRequest>,
    cancellations: Vec<TransactionId>,
    permission_updates: Vec<PermissionUpdate>,
}

/// The capability surface handed to action handlers.
///
/// Reads see the transaction's own prior writes (the overlay) before the
/// backing store; writes and scheduling requests are buffered until the
/// executor commits.
pub struct ActionContext<'a> {
    store: &'a dyn StateStore,
    now: TimePoint,
    receiver: AccountName,
    writes: WriteSet,
    deferred: Vec<DeferredRequest>,
    cancellations: Vec<TransactionId>,
    permission_updates: Vec<PermissionUpdate>,
}

impl<'a> ActionContext<'a> {
    fn new(store: &'a dyn StateStore, now: TimePoint) -> Self {
        Self {
            store,
            now,
            receiver: AccountName::new(""),
            writes: WriteSet::new(),
            deferred: Vec::new(),
            cancellations: Vec::new(),
            permission_updates: Vec::new(),
        }
    }

    fn begin_action(&mut self, receiver: AccountName) {
        self.receiver = receiver;
    }

    fn into_effects(self) -> TransactionEffects {
        TransactionEffects {
            writes: self.writes,
            deferred: self.deferred,
            cancellations: self.cancellations,
            permission_updates: self.permission_updates,
        }
    }

    /// Current block time.
    pub fn now(&self) -> TimePoint {
        self.now
    }

    /// The account whose contract is currently running.
    pub fn receiver(&self) -> &AccountName {
        &self.receiver
    }

    /// Reads contract state, overlay first.
    pub fn get(&self, scope: &AccountName, key: &[u8]) -> Option<Vec<u8>> {
        match self.writes.get(&(scope.clone(), key.to_vec())) {
            Some(staged) => staged.clone(),
            None => self.store.get(scope, key),
        }
    }

    /// Stages a contract state write.
    pub fn set(&mut self, scope: &AccountName, key: &[u8], value: Vec<u8>) {
        self.writes
            .insert((scope.clone(), key.to_vec()), Some(value));
    }

    /// Stages a contract state deletion.
    pub fn remove(&mut self, scope: &AccountName, key: &[u8]) {
        self.writes.insert((scope.clone(), key.to_vec()), None);
    }

    /// Requests delivery of a follow-up transaction after `delay`.
    ///
    /// The origin sender is the currently running contract account.
    pub fn send_deferred(&mut self, transaction: Transaction, delay: Duration) {
        self.deferred.push(DeferredRequest {
            sender: self.receiver.clone(),
            transaction,
            delay,
        });
    }

    /// Requests cancellation of a pending deferred transaction.
    pub fn cancel_deferred(&mut self, id: TransactionId) {
        self.cancellations.push(id);
    }

    /// Requests a permission update, time-locked by `delay`.
    pub fn update_permission(
        &mut self,
        account: AccountName,
        permission: PermissionName,
        authority: Authority,
        delay: Duration,
    ) {
        self.permission_updates.push(PermissionUpdate {
            account,
            permission,
            authority,
            delay,
        });
    }
}

/// Checks every declared `(actor, permission)` pair of every action against
/// the effective authority at `now`.
pub fn check_authorization(
    state: &LedgerState,
    transaction: &Transaction,
    now: TimePoint,
) -> Result<()> {
    if transaction.actions.is_empty() {
        return Err(ControllerError::EmptyTransaction);
    }
    let signers: BTreeSet<KeyId> = transaction.signed_by.iter().copied().collect();
    for action in &transaction.actions {
        for level in &action.authorization {
            let satisfied =
                state
                    .authority
                    .satisfies(&signers, &level.actor, &level.permission, now)?;
            if !satisfied {
                debug!(actor = %level.actor, permission = %level.permission, "authorization not satisfied");
                return Err(ControllerError::AuthorizationFailure {
                    actor: level.actor.clone(),
                    permission: level.permission.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Applies one transaction at block time `now` and returns its action
/// traces.
///
/// On any error nothing has been committed: failures are hard rejections
/// for fresh submissions and recoverable (`soft_fail`/`hard_fail`) outcomes
/// for deferred deliveries; that classification is the scheduler's job.
pub fn apply(
    state: &mut LedgerState,
    store: &mut dyn StateStore,
    dispatcher: &dyn ActionDispatcher,
    transaction: &Transaction,
    now: TimePoint,
) -> Result<Vec<ActionTrace>> {
    state.authority.activate_due_changes(now);
    check_authorization(state, transaction, now)?;

    let mut traces = Vec::with_capacity(transaction.actions.len());
    let mut ctx = ActionContext::new(&*store, now);
    for action in &transaction.actions {
        ctx.begin_action(action.scope.clone());
        dispatcher.dispatch(action, &mut ctx).map_err(|assertion| {
            debug!(scope = %action.scope, name = %action.name, %assertion, "action handler asserted");
            ControllerError::AssertionFailure {
                receiver: action.scope.clone(),
                message: assertion.message,
            }
        })?;
        traces.push(ActionTrace {
            receiver: action.scope.clone(),
            action: action.clone(),
        });
    }

    // Consuming the context ends its borrow of the store before commit
    // takes the store mutably.
    let effects = ctx.into_effects();
    commit(state, store, effects, now)?;
    Ok(traces)
}

/// Applies staged effects in one step. Validation runs before any mutation
/// so a failure leaves the ledger untouched.
fn commit(
    state: &mut LedgerState,
    store: &mut dyn StateStore,
    effects: TransactionEffects,
    now: TimePoint,
) -> Result<()> {
    // Duplicate deferred ids abort the whole transaction. An id the same
    // transaction cancels may be reused.
    let mut seen = BTreeSet::new();
    for request in &effects.deferred {
        let id = request.transaction.id();
        let cancelled = effects.cancellations.contains(&id);
        if !seen.insert(id) || (state.deferred.contains(&id) && !cancelled) {
            return Err(ControllerError::DuplicateDeferredId(id));
        }
    }
    for update in &effects.permission_updates {
        if !state.authority.has_account(&update.account) {
            return Err(AuthorityError::UnknownAccount(update.account.clone()).into());
        }
        if !state.authority.has_permission(&update.account, &update.permission) {
            return Err(AuthorityError::UnknownPermission {
                account: update.account.clone(),
                permission: update.permission.clone(),
            }
            .into());
        }
        if !update.authority.is_valid() {
            return Err(AuthorityError::InvalidAuthority {
                account: update.account.clone(),
                permission: update.permission.clone(),
                threshold: update.authority.threshold,
                total_weight: update.authority.total_weight(),
            }
            .into());
        }
    }

    for update in effects.permission_updates {
        state.authority.request_permission_update(
            &update.account,
            &update.permission,
            update.authority,
            update.delay,
            now,
        )?;
    }
    for id in &effects.cancellations {
        state.deferred.cancel(id);
    }
    for request in effects.deferred {
        let delivery_time = now + request.delay;
        debug!(
            id = %request.transaction.id(),
            sender = %request.sender,
            %delivery_time,
            "deferred transaction scheduled"
        );
        state
            .deferred
            .enqueue(DeferredEntry::new(request.sender, request.transaction, delivery_time))?;
    }
    store.apply(effects.writes);
    Ok(())
}
