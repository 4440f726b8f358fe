use edao_types::{BlockHeight, Principal};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SaleEvent {
    Start {
        start_height: BlockHeight,
        end_height: BlockHeight,
    },
    Buy {
        buyer: Principal,
        amount: u128,
        cost: u128,
    },
    Claim {
        claimer: Principal,
        amount: u128,
    },
    Refund {
        refundee: Principal,
        amount: u128,
        refunded: u128,
    },
    Withdraw {
        recipient: Principal,
        amount: u128,
    },
}
