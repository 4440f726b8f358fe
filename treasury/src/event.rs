use crate::asset::Asset;
use edao_types::Principal;
use serde::{Deserialize, Serialize};

/// Events emitted by the treasury.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TreasuryEvent {
    Deposit {
        asset: Asset,
        amount: u128,
        sender: Principal,
    },
    Transfer {
        asset: Asset,
        amount: u128,
        recipient: Principal,
        memo: Option<String>,
    },
}
