//! # Core Domain Entities
//!
//! Defines the ledger entities shared by every subsystem crate.
//!
//! ## Clusters
//!
//! - **Naming**: `AccountName`, `PermissionName`, `ActionName`, `KeyId`
//! - **Time**: `TimePoint` (block time, millisecond resolution)
//! - **Value**: `Asset` (fixed four-decimal amounts with a symbol code)
//! - **Transactions**: `PermissionLevel`, `Action`, `Transaction`,
//!   `TransactionId`, `ActionTrace`
//! - **Chain**: `BlockHeader`, `BlockId`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// Compute the SHA-256 hash of a byte slice.
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

// =============================================================================
// NAMING
// =============================================================================

/// The name of a ledger account (e.g. `alice`, `proxy`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountName(String);

impl AccountName {
    /// Creates an account name from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The name of a permission attached to an account (e.g. `owner`, `active`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionName(String);

impl PermissionName {
    /// Creates a permission name from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The conventional root permission.
    pub fn owner() -> Self {
        Self::new("owner")
    }

    /// The conventional default signing permission.
    pub fn active() -> Self {
        Self::new("active")
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The name of a contract action (e.g. `transfer`, `setowner`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionName(String);

impl ActionName {
    /// Creates an action name from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Opaque identifier for a signing key.
///
/// Signature recovery happens in the external signing layer; the core only
/// compares identifiers. [`KeyId::from_seed`] derives a deterministic id,
/// which is how test fixtures mint per-account keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct KeyId(pub Hash);

impl KeyId {
    /// Derives a deterministic key id from a seed string.
    pub fn from_seed(seed: &str) -> Self {
        Self(sha256(seed.as_bytes()))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

// =============================================================================
// TIME
// =============================================================================

/// A point on the block timeline, in milliseconds since the chain epoch.
///
/// Block time is monotonic and non-decreasing; it only advances when a block
/// is produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TimePoint(u64);

impl TimePoint {
    /// Creates a time point from milliseconds since the chain epoch.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Creates a time point from whole seconds since the chain epoch.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000)
    }

    /// Milliseconds since the chain epoch.
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

impl Add<Duration> for TimePoint {
    type Output = TimePoint;

    fn add(self, rhs: Duration) -> TimePoint {
        TimePoint(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1_000, self.0 % 1_000)
    }
}

// =============================================================================
// VALUE
// =============================================================================

/// A token amount with four implied decimal places and a symbol code.
///
/// `Asset::from_string("5.0000 EOS")` parses the canonical textual form; the
/// stored amount is `50_000`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Amount in units of 1/10_000 of a token.
    pub amount: i64,
    /// Symbol code, e.g. `EOS`.
    pub symbol: String,
}

impl Asset {
    /// Number of implied decimal places.
    pub const PRECISION: u32 = 4;

    const SCALE: i64 = 10_000;

    /// Creates an asset from a raw sub-unit amount.
    pub fn new(amount: i64, symbol: impl Into<String>) -> Self {
        Self {
            amount,
            symbol: symbol.into(),
        }
    }

    /// Parses the canonical textual form, e.g. `"5.0000 EOS"`.
    pub fn from_string(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let number = parts.next()?;
        let symbol = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        let (negative, number) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (integral, fractional) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if fractional.len() > Self::PRECISION as usize {
            return None;
        }

        let integral: i64 = integral.parse().ok()?;
        let fractional: i64 = if fractional.is_empty() {
            0
        } else {
            // Right-pad to four decimals: "5.5" means 5.5000.
            let padded = format!("{:0<4}", fractional);
            padded.parse().ok()?
        };

        let amount = integral.checked_mul(Self::SCALE)?.checked_add(fractional)?;
        let amount = if negative { -amount } else { amount };
        Some(Self::new(amount, symbol))
    }

    /// Checked addition; `None` if the symbols differ or the amount overflows.
    pub fn checked_add(&self, other: &Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        Some(Asset::new(self.amount.checked_add(other.amount)?, self.symbol.clone()))
    }

    /// Checked subtraction; `None` if the symbols differ or the amount overflows.
    pub fn checked_sub(&self, other: &Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        Some(Asset::new(self.amount.checked_sub(other.amount)?, self.symbol.clone()))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();
        write!(
            f,
            "{}{}.{:04} {}",
            sign,
            magnitude / Self::SCALE as u64,
            magnitude % Self::SCALE as u64,
            self.symbol
        )
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// An `(actor, permission)` authorization pair declared on an action.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    /// The account whose authority is being exercised.
    pub actor: AccountName,
    /// The named permission of that account.
    pub permission: PermissionName,
}

impl PermissionLevel {
    /// Creates an authorization pair.
    pub fn new(actor: impl Into<AccountName>, permission: impl Into<PermissionName>) -> Self {
        Self {
            actor: actor.into(),
            permission: permission.into(),
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

/// One step of a transaction: a named operation addressed to a contract
/// account (`scope`), carrying declared authorizations and an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The account whose contract handles this action.
    pub scope: AccountName,
    /// The operation name within that contract.
    pub name: ActionName,
    /// Authorization pairs that must be satisfied before dispatch.
    pub authorization: Vec<PermissionLevel>,
    /// Opaque payload bytes, produced by the external ABI codec.
    pub data: Vec<u8>,
}

impl Action {
    /// Creates an action.
    pub fn new(
        scope: impl Into<AccountName>,
        name: impl Into<ActionName>,
        authorization: Vec<PermissionLevel>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
            authorization,
            data,
        }
    }
}

/// Deterministic, content-derived transaction identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TransactionId(pub Hash);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// An ordered sequence of actions, immutable once signed.
///
/// `signed_by` holds the key ids recovered by the external signature layer;
/// the core never verifies signatures itself. A non-zero `delay` requests
/// sender-side deferral: the transaction is enqueued instead of executed and
/// its receipt is recorded as `Delayed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Actions applied in order; the transaction is all-or-nothing.
    pub actions: Vec<Action>,
    /// Sender-requested delivery delay. Zero means immediate execution.
    pub delay: Duration,
    /// Key ids recovered from the transaction's signatures.
    pub signed_by: Vec<KeyId>,
}

impl Transaction {
    /// Creates an immediate transaction from its actions.
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            delay: Duration::ZERO,
            signed_by: Vec::new(),
        }
    }

    /// Requests sender-side deferral by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Attaches recovered signing keys.
    pub fn signed_by(mut self, keys: Vec<KeyId>) -> Self {
        self.signed_by = keys;
        self
    }

    /// The content-derived identifier of this transaction.
    ///
    /// Derived from the canonical bincode encoding of the whole body, so a
    /// deferred transaction keeps the same id across delivery attempts.
    pub fn id(&self) -> TransactionId {
        let bytes = bincode::serialize(self).unwrap_or_default();
        TransactionId(sha256(&bytes))
    }
}

/// The record of one action dispatch, kept on the transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTrace {
    /// The account whose contract received the action.
    pub receiver: AccountName,
    /// The dispatched action.
    pub action: Action,
}

// =============================================================================
// CHAIN
// =============================================================================

/// Identifier of a produced block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct BlockId(pub Hash);

/// Header of a produced block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Block height in the chain.
    pub height: u64,
    /// Block time; every timestamp in the ledger is one of these.
    pub timestamp: TimePoint,
    /// Id of the previous block header (chain linkage).
    pub previous: BlockId,
}

impl BlockHeader {
    /// The content-derived id of this header.
    pub fn id(&self) -> BlockId {
        let bytes = bincode::serialize(self).unwrap_or_default();
        BlockId(sha256(&bytes))
    }
}
