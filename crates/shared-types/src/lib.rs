//! # Shared Types Crate
//!
//! Cross-subsystem domain entities for the Timelock-Ledger runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a subsystem boundary
//!   (authority model, deferred scheduler, controller façade) lives here.
//! - **Content-addressed transactions**: a [`TransactionId`] is derived from
//!   the canonical byte encoding of the transaction body, so the same
//!   transaction keeps the same identity across delivery attempts.
//! - **Opaque payloads**: action data is carried as raw bytes; the ABI codec
//!   that produced them is an external collaborator.

pub mod entities;

pub use entities::*;
