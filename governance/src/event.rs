use edao_types::{BlockHeight, Principal};
use serde::{Deserialize, Serialize};

use crate::proposal::VoteDirection;

/// Events emitted by the voting engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum VotingEvent {
    Propose {
        proposal: Principal,
        proposer: Principal,
        start_block_height: BlockHeight,
        end_block_height: BlockHeight,
    },
    Vote {
        proposal: Principal,
        voter: Principal,
        direction: VoteDirection,
        amount: u128,
    },
    Conclude {
        proposal: Principal,
        passed: bool,
    },
}
