use edao_types::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("caller is not the DAO or an enabled extension")]
    Unauthorised,

    #[error("caller does not own the tokens")]
    NotTokenOwner,

    #[error("insufficient undelegated tokens: need {needed}, spendable {available}")]
    InsufficientUndelegatedTokens { needed: u128, available: u128 },

    #[error("rescinding {requested} but only {delegated} delegated")]
    RescindingMoreThanDelegated { requested: u128, delegated: u128 },

    #[error("amount to send is non-positive")]
    AmountToSendIsNonPositive,

    #[error("token transfers are locked")]
    TransferIsLocked,

    #[error("insufficient unlocked tokens: need {needed}, unlocked {available}")]
    InsufficientUnlockedTokens { needed: u128, available: u128 },

    #[error("unlocking {requested} but only {locked} locked")]
    UnlockingMoreThanLocked { requested: u128, locked: u128 },

    #[error("cannot delegate to self")]
    SelfDelegation,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("state snapshot could not be decoded: {0}")]
    Snapshot(String),
}

impl ErrorCode for TokenError {
    fn code(&self) -> u32 {
        match self {
            Self::Unauthorised => 2000,
            Self::NotTokenOwner => 2001,
            Self::InsufficientUndelegatedTokens { .. } => 2002,
            Self::RescindingMoreThanDelegated { .. } => 2003,
            Self::AmountToSendIsNonPositive => 2004,
            Self::TransferIsLocked => 2005,
            Self::InsufficientUnlockedTokens { .. } => 2006,
            Self::UnlockingMoreThanLocked { .. } => 2007,
            Self::SelfDelegation => 2008,
            Self::Overflow | Self::Snapshot(_) => 2009,
        }
    }

    fn contract(&self) -> &'static str {
        "edao-token"
    }
}
