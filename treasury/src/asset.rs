//! Asset identities and transfer instructions.

use edao_types::Principal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something the treasury can hold.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Stx,
    /// A fungible token contract.
    Ft { contract: Principal },
    /// One token of a non-fungible contract.
    Nft { contract: Principal, id: u128 },
    /// One token id of a semi-fungible contract.
    Sft { contract: Principal, id: u128 },
}

impl Asset {
    pub fn is_nft(&self) -> bool {
        matches!(self, Self::Nft { .. })
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stx => write!(f, "STX"),
            Self::Ft { contract } => write!(f, "{contract}"),
            Self::Nft { contract, id } => write!(f, "{contract}#{id}"),
            Self::Sft { contract, id } => write!(f, "{contract}:{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StxTransfer {
    pub amount: u128,
    pub recipient: Principal,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtTransfer {
    pub amount: u128,
    pub recipient: Principal,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransfer {
    pub token_id: u128,
    pub recipient: Principal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftTransfer {
    pub token_id: u128,
    pub amount: u128,
    pub recipient: Principal,
    #[serde(default)]
    pub memo: Option<String>,
}
