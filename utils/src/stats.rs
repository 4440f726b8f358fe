//! Block and transaction statistics for the chain simulator.

use serde::Serialize;
use std::fmt;

/// Running totals since the simulator started (or was restored).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChainStats {
    /// Blocks mined with a transaction list, possibly empty.
    pub blocks: u64,
    /// Blocks skipped by `mine_empty_block`.
    pub empty_blocks: u64,
    pub tx_accepted: u64,
    pub tx_rejected: u64,
    /// Events emitted by accepted transactions.
    pub events: u64,
}

impl ChainStats {
    pub fn record_block(&mut self) {
        self.blocks += 1;
    }

    pub fn record_empty_blocks(&mut self, count: u64) {
        self.empty_blocks = self.empty_blocks.saturating_add(count);
    }

    pub fn record_accepted(&mut self, events: usize) {
        self.tx_accepted += 1;
        self.events = self.events.saturating_add(events as u64);
    }

    pub fn record_rejected(&mut self) {
        self.tx_rejected += 1;
    }

    /// Every transaction seen, accepted or not.
    pub fn transactions(&self) -> u64 {
        self.tx_accepted + self.tx_rejected
    }

    /// Height advanced since the counters started.
    pub fn height_advanced(&self) -> u64 {
        self.blocks.saturating_add(self.empty_blocks)
    }
}

impl fmt::Display for ChainStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocks={} empty_blocks={} tx_accepted={} tx_rejected={} events={}",
            self.blocks, self.empty_blocks, self.tx_accepted, self.tx_rejected, self.events
        )
    }
}
