//! The numeric error-code contract shared by every engine.

use thiserror::Error;

/// An error with a stable numeric code, scoped to the contract that raised it.
///
/// Codes overlap between contracts (the treasury and the voting engine both
/// use 3000 for "unauthorised"), so callers disambiguate with [`contract`].
///
/// [`contract`]: ErrorCode::contract
pub trait ErrorCode {
    /// Stable numeric code.
    fn code(&self) -> u32;

    /// Short name of the contract namespace the code belongs to.
    fn contract(&self) -> &'static str;
}

/// Errors from parsing shared types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid principal: {0:?}")]
    InvalidPrincipal(String),

    #[error("pass threshold must be at most 10000 basis points, got {0}")]
    InvalidThreshold(u32),
}
