use edao_governance::{SubmissionError, VotingError};
use edao_sale::SaleError;
use edao_token::TokenError;
use edao_treasury::TreasuryError;
use edao_types::ErrorCode;
use thiserror::Error;

use crate::dao::DaoError;

/// Why a transaction was rejected. Each variant carries the error of the
/// contract that refused it, so the numeric code is that contract's code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error(transparent)]
    Dao(#[from] DaoError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Voting(#[from] VotingError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    #[error(transparent)]
    Sale(#[from] SaleError),
}

impl TxError {
    fn inner(&self) -> &dyn ErrorCode {
        match self {
            Self::Dao(e) => e,
            Self::Token(e) => e,
            Self::Voting(e) => e,
            Self::Submission(e) => e,
            Self::Treasury(e) => e,
            Self::Sale(e) => e,
        }
    }
}

impl ErrorCode for TxError {
    fn code(&self) -> u32 {
        self.inner().code()
    }

    fn contract(&self) -> &'static str {
        self.inner().contract()
    }
}

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("state error: {0}")]
    State(String),

    #[error("proposal {0} is already deployed")]
    ProposalAlreadyDeployed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
