//! Block height — the only notion of time in the system.
//!
//! Heights are supplied by the chain driver and threaded explicitly into every
//! time-gated check; nothing in the core reads a clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A block height.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockHeight(u64);

impl BlockHeight {
    /// The genesis height.
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Height `blocks` after this one, saturating at `u64::MAX`.
    pub fn saturating_add(self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }

    /// Blocks remaining from `self` until `later` (0 if `later` has passed).
    pub fn blocks_until(&self, later: BlockHeight) -> u64 {
        later.0.saturating_sub(self.0)
    }

    /// Whether `self` lies in the half-open window `[start, end)`.
    pub fn is_within(&self, start: BlockHeight, end: BlockHeight) -> bool {
        *self >= start && *self < end
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(h: u64) -> Self {
        Self(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_until_saturates() {
        let h = BlockHeight::new(1300);
        assert_eq!(h.blocks_until(BlockHeight::new(1586)), 286);
        assert_eq!(BlockHeight::new(2000).blocks_until(BlockHeight::new(1586)), 0);
    }

    #[test]
    fn window_is_half_open() {
        let start = BlockHeight::new(289);
        let end = BlockHeight::new(1729);
        assert!(!BlockHeight::new(288).is_within(start, end));
        assert!(BlockHeight::new(289).is_within(start, end));
        assert!(BlockHeight::new(1728).is_within(start, end));
        assert!(!BlockHeight::new(1729).is_within(start, end));
    }
}
