//! Configuration for the ledger controller.

use serde::{Deserialize, Serialize};
use shared_types::TimePoint;
use std::time::Duration;

/// Chain configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Fixed interval the block clock advances per produced block.
    pub block_interval: Duration,
    /// Block time of the genesis block.
    pub genesis_time: TimePoint,
    /// Bound on recursive authority delegation.
    pub max_delegation_depth: u8,
    /// Optional cap on delivery attempts for a deferred transaction.
    ///
    /// `None` retries soft failures unconditionally until the blocking
    /// condition resolves; `Some(n)` converts an entry into `hard_fail`
    /// once it has soft-failed `n` times.
    pub max_deferred_retries: Option<u32>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            block_interval: Duration::from_millis(500),
            genesis_time: TimePoint::from_secs(0),
            max_delegation_depth: 6,
            max_deferred_retries: None,
        }
    }
}
