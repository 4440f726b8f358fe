//! The EDAO governance token.
//!
//! A fungible ledger with three coupled subsystems:
//!
//! - **Ledger**: balances, total supply, the transfer-lock flag
//! - **Delegation**: custody moves to a delegate while the delegator keeps a
//!   pairwise claim, recoverable by rescinding
//! - **Lock**: a per-account counter of tokens committed to live votes
//!
//! Privileged entry points (`edg_*`) take the caller and an
//! [`Authority`](edao_types::Authority) deciding whether the caller is the
//! DAO or an enabled extension.

pub mod account;
pub mod delegation;
pub mod error;
pub mod event;
pub mod ledger;
pub mod lock;

pub use account::Account;
pub use error::TokenError;
pub use event::TokenEvent;
pub use ledger::{GovernanceToken, TokenMetadata, TokenSnapshot};
