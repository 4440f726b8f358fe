use edao_token::TokenError;
use edao_types::ErrorCode;
use thiserror::Error;

/// Errors from the proposal voting engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VotingError {
    #[error("caller is not the DAO or an enabled extension")]
    Unauthorised,

    #[error("proposal {0} already exists")]
    ProposalAlreadyExists(String),

    #[error("unknown proposal {0}")]
    UnknownProposal(String),

    #[error("proposal already concluded")]
    ProposalAlreadyConcluded,

    #[error("proposal is not active")]
    ProposalInactive,

    #[error("proposal has not ended")]
    ProposalNotConcluded,

    #[error("end block height not reached: now {now}, end {end}")]
    EndBlockHeightNotReached { now: u64, end: u64 },

    #[error("rescind time lock active: {remaining} blocks remain, lock is {lock}")]
    RescindTimeLockActive { remaining: u64, lock: u64 },

    #[error("rescinding more than cast")]
    RescindingMoreThanCast,

    #[error("rescinding {requested} but only {delegated} delegated")]
    RescindingMoreThanDelegated { requested: u128, delegated: u128 },

    #[error("not the governance token")]
    NotGovernanceToken,

    #[error("state snapshot could not be decoded: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ErrorCode for VotingError {
    fn code(&self) -> u32 {
        match self {
            Self::Unauthorised | Self::Snapshot(_) => 3000,
            Self::ProposalAlreadyExists(_) => 3003,
            Self::UnknownProposal(_) => 3004,
            Self::ProposalAlreadyConcluded => 3005,
            Self::ProposalInactive => 3006,
            Self::ProposalNotConcluded => 3007,
            Self::EndBlockHeightNotReached { .. } => 3009,
            Self::RescindTimeLockActive { .. } => 3011,
            Self::RescindingMoreThanCast => 3012,
            Self::RescindingMoreThanDelegated { .. } => 3013,
            Self::NotGovernanceToken => 3014,
            Self::Token(e) => e.code(),
        }
    }

    fn contract(&self) -> &'static str {
        match self {
            Self::Token(e) => e.contract(),
            _ => "edao-voting",
        }
    }
}

/// Errors from proposal submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("caller is not the DAO or an enabled extension")]
    Unauthorised,

    #[error("not the governance token")]
    NotGovernanceToken,

    #[error("insufficient balance to propose: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },

    #[error("unknown parameter {0:?}")]
    UnknownParameter(String),

    #[error("start height {start} is earlier than {earliest}")]
    ProposalMinimumStartDelay { start: u64, earliest: u64 },

    #[error("start height {start} is later than {latest}")]
    ProposalMaximumStartDelay { start: u64, latest: u64 },

    #[error(transparent)]
    Voting(#[from] VotingError),
}

impl ErrorCode for SubmissionError {
    fn code(&self) -> u32 {
        match self {
            Self::Unauthorised => 3100,
            Self::NotGovernanceToken => 3101,
            Self::InsufficientBalance { .. } => 3102,
            Self::UnknownParameter(_) => 3103,
            Self::ProposalMinimumStartDelay { .. } => 3104,
            Self::ProposalMaximumStartDelay { .. } => 3105,
            Self::Voting(e) => e.code(),
        }
    }

    fn contract(&self) -> &'static str {
        match self {
            Self::Voting(e) => e.contract(),
            _ => "edao-submission",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_callee_code() {
        let e = VotingError::from(TokenError::InsufficientUnlockedTokens {
            needed: 1,
            available: 0,
        });
        assert_eq!(e.code(), 2006);
        assert_eq!(e.contract(), "edao-token");

        let s = SubmissionError::from(VotingError::ProposalAlreadyExists("p".into()));
        assert_eq!(s.code(), 3003);
        assert_eq!(s.contract(), "edao-voting");
    }
}
