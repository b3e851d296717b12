//! # Authority Model Subsystem
//!
//! Accounts, their named permissions, and the time-lock attached to every
//! permission change.
//!
//! ## Purpose
//!
//! Rotating or recovering a permission key must never take effect
//! instantaneously: a permission carries a `delay`, and an update requested
//! at time `T` only becomes the *effective* authority at `T + delay`. Until
//! then the previous authority keeps validating transactions while the new
//! one waits as a named pending change. This is what produces the
//! soft-fail-then-retry pattern in the deferred scheduler: a delivery signed
//! for an authority that is mid-rotation fails authorization until the
//! rotation settles.
//!
//! ## Key Invariants
//!
//! 1. **Delay gating**: an update requested at `T` with delay `d` is not
//!    effective for any check before `T + d`, and is effective for every
//!    check at or after `T + d`.
//! 2. **One pending change per permission**: a new request supersedes any
//!    earlier pending change on the same permission.
//! 3. **Bounded delegation**: recursive authority resolution is depth
//!    limited; cyclic delegation is a hard error, never an infinite loop.

pub mod domain;

pub use domain::entities::{
    AccountWeight, Authority, KeyWeight, PendingAuthorityChange, Permission,
};
pub use domain::errors::AuthorityError;
pub use domain::model::AuthorityModel;
