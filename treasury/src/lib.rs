//! The EDAO treasury extension.
//!
//! Holds STX, fungible (SIP010), non-fungible (SIP009) and semi-fungible
//! (SIP013) assets on behalf of the DAO. Anyone may deposit; only the DAO or
//! an enabled extension may move assets out. Transfers of the governance
//! token itself go through the token ledger so balances stay in one place.

pub mod asset;
pub mod error;
pub mod event;
pub mod treasury;

pub use asset::{Asset, FtTransfer, NftTransfer, SftTransfer, StxTransfer};
pub use error::TreasuryError;
pub use event::TreasuryEvent;
pub use treasury::{Treasury, TreasurySnapshot};
