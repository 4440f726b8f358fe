//! Proposal contracts: a principal plus the ordered actions the DAO runs
//! when the proposal is executed.

use edao_treasury::{FtTransfer, NftTransfer, SftTransfer, StxTransfer};
use edao_types::Principal;
use serde::{Deserialize, Serialize};

/// A token amount for one recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub amount: u128,
    pub recipient: Principal,
}

/// One step of a proposal, run with the DAO as caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalAction {
    SetExtension {
        extension: Principal,
        enabled: bool,
    },
    SetTransferLock {
        locked: bool,
    },
    Mint {
        amount: u128,
        recipient: Principal,
    },
    MintMany {
        allocations: Vec<Allocation>,
    },
    Burn {
        amount: u128,
        owner: Principal,
    },
    EdgTransfer {
        amount: u128,
        sender: Principal,
        recipient: Principal,
    },
    SetSubmissionParameter {
        parameter: String,
        value: u128,
    },
    StxTransfer {
        transfers: Vec<StxTransfer>,
    },
    Sip009Transfer {
        asset: Principal,
        transfers: Vec<NftTransfer>,
    },
    Sip010Transfer {
        asset: Principal,
        transfers: Vec<FtTransfer>,
    },
    Sip013Transfer {
        asset: Principal,
        transfers: Vec<SftTransfer>,
    },
    /// Move the proceeds of a successful token sale into the treasury.
    WithdrawSaleProceeds,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalContract {
    pub principal: Principal,
    #[serde(default)]
    pub actions: Vec<ProposalAction>,
}

impl ProposalContract {
    pub fn new(principal: Principal, actions: Vec<ProposalAction>) -> Self {
        Self { principal, actions }
    }

    /// Deploy under `deployer` with the given contract name.
    pub fn deployed_by(deployer: &Principal, name: &str, actions: Vec<ProposalAction>) -> Self {
        Self::new(Principal::contract(deployer, name), actions)
    }

    /// The bootstrap proposal: enable the core extensions and mint the
    /// genesis allocations.
    pub fn bootstrap(
        principal: Principal,
        extensions: &[Principal],
        allocations: Vec<Allocation>,
    ) -> Self {
        let mut actions: Vec<_> = extensions
            .iter()
            .map(|e| ProposalAction::SetExtension {
                extension: e.clone(),
                enabled: true,
            })
            .collect();
        if !allocations.is_empty() {
            actions.push(ProposalAction::MintMany { allocations });
        }
        Self::new(principal, actions)
    }
}
