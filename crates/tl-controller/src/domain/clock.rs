//! The block clock.
//!
//! Block time is the only time the ledger knows. It is monotonic and
//! non-decreasing, and advances exactly one fixed interval per produced
//! block; producing a block is the only clock-advancing operation.

use shared_types::TimePoint;
use std::time::Duration;

/// Fixed-interval monotonic block clock.
#[derive(Debug, Clone)]
pub struct BlockClock {
    head_time: TimePoint,
    interval: Duration,
}

impl BlockClock {
    /// Creates a clock at `genesis` ticking by `interval`.
    pub fn new(genesis: TimePoint, interval: Duration) -> Self {
        Self {
            head_time: genesis,
            interval,
        }
    }

    /// Current head block time.
    pub fn head_time(&self) -> TimePoint {
        self.head_time
    }

    /// The block interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advances one block interval and returns the new head time.
    pub fn advance(&mut self) -> TimePoint {
        self.head_time = self.head_time + self.interval;
        self.head_time
    }
}
