//! Domain layer: pure ledger logic.

pub mod clock;
pub mod deferred;
pub mod executor;
pub mod receipts;
pub mod state;
