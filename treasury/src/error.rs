use crate::asset::Asset;
use edao_token::TokenError;
use edao_types::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("caller is not the DAO or an enabled extension")]
    Unauthorised,

    #[error("insufficient {asset} in treasury: need {needed}, have {available}")]
    InsufficientBalance {
        asset: Asset,
        needed: u128,
        available: u128,
    },

    #[error("treasury does not own {0}")]
    NotAssetOwner(Asset),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ErrorCode for TreasuryError {
    fn code(&self) -> u32 {
        match self {
            Self::Unauthorised => 3000,
            Self::InsufficientBalance { .. } => 3001,
            Self::NotAssetOwner(_) => 3002,
            Self::Token(e) => e.code(),
        }
    }

    fn contract(&self) -> &'static str {
        match self {
            Self::Token(e) => e.contract(),
            _ => "edao-treasury",
        }
    }
}
