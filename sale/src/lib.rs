//! The EDAO governance token sale.
//!
//! A fixed-duration sale started by anyone. Buyers commit STX for an
//! allocation; nothing is minted until the sale ends. If the total
//! allocation reaches the configured minimum, buyers claim their tokens
//! (minted through the token as an extension); otherwise they take their STX
//! back.

pub mod error;
pub mod event;
pub mod sale;

pub use error::SaleError;
pub use event::SaleEvent;
pub use sale::{SalePhase, SaleSnapshot, TokenSale};
