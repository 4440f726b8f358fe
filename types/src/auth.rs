//! Authority seam for privileged calls.

use crate::principal::Principal;

/// Decides whether a caller may invoke privileged entry points.
///
/// The DAO core implements this: the DAO itself and every enabled extension
/// are authorised, nobody else is.
pub trait Authority {
    fn is_dao_or_extension(&self, caller: &Principal) -> bool;
}

/// An authority that accepts every caller. Only for tests and tooling.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenAuthority;

impl Authority for OpenAuthority {
    fn is_dao_or_extension(&self, _caller: &Principal) -> bool {
        true
    }
}
