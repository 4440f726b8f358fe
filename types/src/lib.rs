//! Fundamental types for the EDAO governance system.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! principals, block heights, the numeric error-code contract, the authority seam
//! used for privileged calls, and the governance parameters.

pub mod auth;
pub mod error;
pub mod height;
pub mod params;
pub mod principal;

pub use auth::{Authority, OpenAuthority};
pub use error::{ErrorCode, TypesError};
pub use height::BlockHeight;
pub use params::{GovernanceParams, SaleParams};
pub use principal::Principal;
