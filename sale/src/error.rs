use edao_token::TokenError;
use edao_types::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaleError {
    #[error("caller is not the DAO or an enabled extension")]
    Unauthorised,

    #[error("allocation of {requested} exceeds the maximum of {maximum}")]
    NoAllowance { requested: u128, maximum: u128 },

    #[error("allocation already claimed")]
    AlreadyClaimed,

    #[error("sale already started")]
    SaleAlreadyStarted,

    #[error("sale is not running")]
    SaleEnded,

    #[error("sale has not ended")]
    SaleNotEnded,

    #[error("sale succeeded, refunds are closed")]
    SaleSucceeded,

    #[error("sale failed to reach its minimum")]
    SaleFailed,

    #[error("nothing to claim")]
    NothingToClaim,

    #[error("nothing to refund")]
    NothingToRefund,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ErrorCode for SaleError {
    fn code(&self) -> u32 {
        match self {
            Self::Unauthorised => 3000,
            Self::NoAllowance { .. } => 3001,
            Self::AlreadyClaimed => 3002,
            Self::SaleAlreadyStarted => 3003,
            Self::SaleEnded => 3004,
            Self::SaleNotEnded => 3005,
            Self::SaleSucceeded => 3006,
            Self::SaleFailed => 3007,
            Self::NothingToClaim => 3008,
            Self::NothingToRefund => 3009,
            Self::Token(e) => e.code(),
        }
    }

    fn contract(&self) -> &'static str {
        match self {
            Self::Token(e) => e.contract(),
            _ => "edao-sale",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(SaleError::Unauthorised.code(), 3000);
        assert_eq!(SaleError::SaleEnded.code(), 3004);
        assert_eq!(SaleError::NothingToRefund.code(), 3009);
        assert_eq!(SaleError::Token(TokenError::Unauthorised).code(), 2000);
        assert_eq!(SaleError::Token(TokenError::Unauthorised).contract(), "edao-token");
    }
}
