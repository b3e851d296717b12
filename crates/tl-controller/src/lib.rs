//! # Ledger Controller Subsystem
//!
//! Applies signed transactions against account state, enforces the
//! time-locked authority-change policy, and automatically re-delivers
//! transactions that were deferred by contract logic or blocked by the
//! time-lock, tracking each attempt's outcome in a receipt.
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - MemoryStateStore: in-process contract state      │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - ActionDispatcher: external contract sandbox      │
//! │  - StateStore: contract state persistence           │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - TransactionExecutor, DeferredQueue               │
//! │  - ReceiptStore, BlockClock, LedgerState            │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Single writer**: all mutation flows through `&mut LedgerController`;
//!    fresh application, deferred delivery, and authority activation share
//!    one logical timeline.
//! 2. **All-or-nothing transactions**: contract writes, deferred requests,
//!    and permission updates buffered during dispatch commit only when every
//!    action succeeds.
//! 3. **Exactly-once removal**: a due deferred entry is removed from the
//!    queue the moment it is handed to the executor; re-delivery happens
//!    only through explicit rescheduling.
//! 4. **Receipt identity**: a deferred transaction keeps one receipt slot
//!    across delivery attempts; the status is overwritten in place.
//! 5. **Fresh vs deferred failure**: a failed fresh submission is rejected
//!    and never enters history; a failed deferred delivery is recorded
//!    (`soft_fail` / `hard_fail`) and soft failures are re-armed.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use config::ChainConfig;
pub use domain::clock::BlockClock;
pub use domain::deferred::{DeferredEntry, DeferredQueue};
pub use domain::executor::{ActionContext, DeferredRequest};
pub use domain::receipts::{ReceiptStore, TransactionReceipt, TransactionStatus};
pub use domain::state::LedgerState;
pub use error::{ControllerError, Result};
pub use ports::outbound::{ActionDispatcher, AssertionError, StateStore, WriteSet};
pub use service::LedgerController;
