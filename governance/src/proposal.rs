//! Proposals, their lifecycle and per-voter cast records.

use edao_types::{BlockHeight, Principal};
use serde::{Deserialize, Serialize};

/// Where a proposal is in its lifecycle at a given height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Submitted, voting has not opened.
    Pending,
    /// Accepting votes: `start <= height < end`.
    Active,
    /// Voting closed, not yet concluded.
    Ended,
    /// Outcome fixed.
    Concluded,
}

/// Which side a vote was cast on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    For,
    Against,
}

impl VoteDirection {
    pub fn from_bool(in_favour: bool) -> Self {
        if in_favour {
            Self::For
        } else {
            Self::Against
        }
    }

    pub fn is_for(&self) -> bool {
        matches!(self, Self::For)
    }
}

impl From<bool> for VoteDirection {
    fn from(in_favour: bool) -> Self {
        Self::from_bool(in_favour)
    }
}

/// A proposal registered with the voting engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposer: Principal,
    pub start_block_height: BlockHeight,
    pub end_block_height: BlockHeight,
    pub votes_for: u128,
    pub votes_against: u128,
    pub concluded: bool,
    pub passed: bool,
}

impl Proposal {
    pub fn new(proposer: Principal, start: BlockHeight, end: BlockHeight) -> Self {
        Self {
            proposer,
            start_block_height: start,
            end_block_height: end,
            votes_for: 0,
            votes_against: 0,
            concluded: false,
            passed: false,
        }
    }

    pub fn status(&self, height: BlockHeight) -> ProposalStatus {
        if self.concluded {
            ProposalStatus::Concluded
        } else if height < self.start_block_height {
            ProposalStatus::Pending
        } else if height < self.end_block_height {
            ProposalStatus::Active
        } else {
            ProposalStatus::Ended
        }
    }

    pub fn tally(&self, direction: VoteDirection) -> u128 {
        match direction {
            VoteDirection::For => self.votes_for,
            VoteDirection::Against => self.votes_against,
        }
    }

    pub(crate) fn tally_mut(&mut self, direction: VoteDirection) -> &mut u128 {
        match direction {
            VoteDirection::For => &mut self.votes_for,
            VoteDirection::Against => &mut self.votes_against,
        }
    }

    pub fn total_votes(&self) -> u128 {
        self.votes_for.saturating_add(self.votes_against)
    }
}

/// Amount a voter currently has cast on one proposal, per direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub cast_for: u128,
    pub cast_against: u128,
}

impl VoteRecord {
    pub fn cast(&self, direction: VoteDirection) -> u128 {
        match direction {
            VoteDirection::For => self.cast_for,
            VoteDirection::Against => self.cast_against,
        }
    }

    pub(crate) fn cast_mut(&mut self, direction: VoteDirection) -> &mut u128 {
        match direction {
            VoteDirection::For => &mut self.cast_for,
            VoteDirection::Against => &mut self.cast_against,
        }
    }

    pub fn total(&self) -> u128 {
        self.cast_for.saturating_add(self.cast_against)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
