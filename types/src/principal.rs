//! Principal identity: a standard account or a contract.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// An account or contract identity.
///
/// Standard principals are plain account addresses (`ST1PQ...`). Contract
/// principals are `<deployer>.<contract-name>`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    /// Separator between deployer and contract name.
    pub const CONTRACT_SEPARATOR: char = '.';

    /// Create a principal from a raw string without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse and validate a principal.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let principal = Self::new(raw);
        if principal.is_valid() {
            Ok(principal)
        } else {
            Err(TypesError::InvalidPrincipal(raw.to_string()))
        }
    }

    /// Build a contract principal deployed by `deployer`.
    pub fn contract(deployer: &Principal, name: &str) -> Self {
        Self(format!("{}{}{}", deployer.standard_part(), Self::CONTRACT_SEPARATOR, name))
    }

    /// Return the raw principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this principal names a contract.
    pub fn is_contract(&self) -> bool {
        self.0.contains(Self::CONTRACT_SEPARATOR)
    }

    /// The contract name, if this is a contract principal.
    pub fn contract_name(&self) -> Option<&str> {
        self.0
            .split_once(Self::CONTRACT_SEPARATOR)
            .map(|(_, name)| name)
    }

    /// The account part (the deployer for contract principals).
    pub fn standard_part(&self) -> &str {
        match self.0.split_once(Self::CONTRACT_SEPARATOR) {
            Some((deployer, _)) => deployer,
            None => &self.0,
        }
    }

    /// Well-formed: non-empty alphanumeric account part, and a non-empty
    /// contract name made of alphanumerics and dashes when present.
    pub fn is_valid(&self) -> bool {
        let account_ok = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
        match self.0.split_once(Self::CONTRACT_SEPARATOR) {
            Some((deployer, name)) => {
                account_ok(deployer)
                    && !name.is_empty()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            }
            None => account_ok(&self.0),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Principal {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
