//! Events emitted by the token ledger.

use edao_types::Principal;
use serde::{Deserialize, Serialize};

/// A ledger event. Buffered on the ledger and drained by the caller after
/// every successful call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TokenEvent {
    Transfer {
        amount: u128,
        sender: Principal,
        recipient: Principal,
        memo: Option<String>,
    },
    Mint {
        amount: u128,
        recipient: Principal,
    },
    Burn {
        amount: u128,
        owner: Principal,
    },
    Lock {
        amount: u128,
        owner: Principal,
    },
    Unlock {
        amount: u128,
        owner: Principal,
    },
    Delegate {
        amount: u128,
        delegator: Principal,
        delegate: Principal,
    },
    Rescind {
        amount: u128,
        delegator: Principal,
        delegate: Principal,
    },
    TransferLock {
        locked: bool,
    },
}

impl TokenEvent {
    /// Amount moved by this event, if any.
    pub fn amount(&self) -> Option<u128> {
        match self {
            Self::Transfer { amount, .. }
            | Self::Mint { amount, .. }
            | Self::Burn { amount, .. }
            | Self::Lock { amount, .. }
            | Self::Unlock { amount, .. }
            | Self::Delegate { amount, .. }
            | Self::Rescind { amount, .. } => Some(*amount),
            Self::TransferLock { .. } => None,
        }
    }
}
