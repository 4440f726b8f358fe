//! Per-account token state.

use serde::{Deserialize, Serialize};

/// Token state of a single principal.
///
/// `balance` is custody: it includes tokens held on behalf of delegators.
/// `locked` is the part of `balance` committed to live votes and is never
/// larger than `balance`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: u128,
    pub locked: u128,
    /// Tokens held in custody for delegators.
    pub total_delegated: u128,
    /// Tokens this account has delegated to others.
    pub delegated_out: u128,
}

impl Account {
    /// Custody not committed to votes.
    pub fn unlocked(&self) -> u128 {
        self.balance.saturating_sub(self.locked)
    }

    /// What the owner may move or delegate: unlocked custody minus what is
    /// held for delegators.
    pub fn undelegated_spendable(&self) -> u128 {
        self.unlocked().saturating_sub(self.total_delegated)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
