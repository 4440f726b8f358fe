//! Transactions: one call into one contract, made by `sender`.

use edao_treasury::{FtTransfer, NftTransfer, SftTransfer, StxTransfer};
use edao_types::{BlockHeight, Principal};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tx {
    // ── DAO core ─────────────────────────────────────────────────────────
    Construct {
        bootstrap: Principal,
        sender: Principal,
    },
    SetExtension {
        extension: Principal,
        enabled: bool,
        sender: Principal,
    },
    Execute {
        proposal: Principal,
        sender: Principal,
    },

    // ── Governance token ─────────────────────────────────────────────────
    Transfer {
        amount: u128,
        from: Principal,
        recipient: Principal,
        #[serde(default)]
        memo: Option<String>,
        sender: Principal,
    },
    EdgTransfer {
        amount: u128,
        from: Principal,
        recipient: Principal,
        sender: Principal,
    },
    Delegate {
        amount: u128,
        delegate: Principal,
        delegator: Principal,
        sender: Principal,
    },
    Rescind {
        amount: u128,
        delegate: Principal,
        delegator: Principal,
        sender: Principal,
    },
    SetTransferLock {
        locked: bool,
        sender: Principal,
    },
    EdgMint {
        amount: u128,
        recipient: Principal,
        sender: Principal,
    },
    EdgBurn {
        amount: u128,
        owner: Principal,
        sender: Principal,
    },

    // ── Submission and voting ────────────────────────────────────────────
    Propose {
        proposal: Principal,
        start_height: BlockHeight,
        token: Principal,
        sender: Principal,
    },
    SetParameter {
        parameter: String,
        value: u128,
        sender: Principal,
    },
    Vote {
        amount: u128,
        #[serde(rename = "for")]
        in_favour: bool,
        proposal: Principal,
        token: Principal,
        sender: Principal,
    },
    RescindVotes {
        amount: u128,
        #[serde(rename = "for")]
        in_favour: bool,
        proxy: Principal,
        proposal: Principal,
        token: Principal,
        sender: Principal,
    },
    ReclaimVotes {
        proposal: Principal,
        token: Principal,
        sender: Principal,
    },
    Conclude {
        proposal: Principal,
        sender: Principal,
    },

    // ── Treasury ─────────────────────────────────────────────────────────
    DepositStx {
        amount: u128,
        sender: Principal,
    },
    DepositFt {
        asset: Principal,
        amount: u128,
        sender: Principal,
    },
    DepositNft {
        asset: Principal,
        token_id: u128,
        sender: Principal,
    },
    DepositSft {
        asset: Principal,
        token_id: u128,
        amount: u128,
        sender: Principal,
    },
    StxTransfer {
        transfer: StxTransfer,
        sender: Principal,
    },
    StxTransferMany {
        transfers: Vec<StxTransfer>,
        sender: Principal,
    },
    Sip009Transfer {
        transfer: NftTransfer,
        asset: Principal,
        sender: Principal,
    },
    Sip009TransferMany {
        transfers: Vec<NftTransfer>,
        asset: Principal,
        sender: Principal,
    },
    Sip010Transfer {
        transfer: FtTransfer,
        asset: Principal,
        sender: Principal,
    },
    Sip010TransferMany {
        transfers: Vec<FtTransfer>,
        asset: Principal,
        sender: Principal,
    },
    Sip013Transfer {
        transfer: SftTransfer,
        asset: Principal,
        sender: Principal,
    },
    Sip013TransferMany {
        transfers: Vec<SftTransfer>,
        asset: Principal,
        sender: Principal,
    },

    // ── Token sale ───────────────────────────────────────────────────────
    SaleStart {
        sender: Principal,
    },
    SaleBuy {
        amount: u128,
        sender: Principal,
    },
    SaleClaim {
        sender: Principal,
    },
    SaleRefund {
        sender: Principal,
    },
}

impl Tx {
    /// Who signed the transaction.
    pub fn sender(&self) -> &Principal {
        match self {
            Self::Construct { sender, .. }
            | Self::SetExtension { sender, .. }
            | Self::Execute { sender, .. }
            | Self::Transfer { sender, .. }
            | Self::EdgTransfer { sender, .. }
            | Self::Delegate { sender, .. }
            | Self::Rescind { sender, .. }
            | Self::SetTransferLock { sender, .. }
            | Self::EdgMint { sender, .. }
            | Self::EdgBurn { sender, .. }
            | Self::Propose { sender, .. }
            | Self::SetParameter { sender, .. }
            | Self::Vote { sender, .. }
            | Self::RescindVotes { sender, .. }
            | Self::ReclaimVotes { sender, .. }
            | Self::Conclude { sender, .. }
            | Self::DepositStx { sender, .. }
            | Self::DepositFt { sender, .. }
            | Self::DepositNft { sender, .. }
            | Self::DepositSft { sender, .. }
            | Self::StxTransfer { sender, .. }
            | Self::StxTransferMany { sender, .. }
            | Self::Sip009Transfer { sender, .. }
            | Self::Sip009TransferMany { sender, .. }
            | Self::Sip010Transfer { sender, .. }
            | Self::Sip010TransferMany { sender, .. }
            | Self::Sip013Transfer { sender, .. }
            | Self::Sip013TransferMany { sender, .. }
            | Self::SaleStart { sender }
            | Self::SaleBuy { sender, .. }
            | Self::SaleClaim { sender }
            | Self::SaleRefund { sender } => sender,
        }
    }

    /// The call name, as written in scenario files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Construct { .. } => "construct",
            Self::SetExtension { .. } => "set-extension",
            Self::Execute { .. } => "execute",
            Self::Transfer { .. } => "transfer",
            Self::EdgTransfer { .. } => "edg-transfer",
            Self::Delegate { .. } => "delegate",
            Self::Rescind { .. } => "rescind",
            Self::SetTransferLock { .. } => "set-transfer-lock",
            Self::EdgMint { .. } => "edg-mint",
            Self::EdgBurn { .. } => "edg-burn",
            Self::Propose { .. } => "propose",
            Self::SetParameter { .. } => "set-parameter",
            Self::Vote { .. } => "vote",
            Self::RescindVotes { .. } => "rescind-votes",
            Self::ReclaimVotes { .. } => "reclaim-votes",
            Self::Conclude { .. } => "conclude",
            Self::DepositStx { .. } => "deposit-stx",
            Self::DepositFt { .. } => "deposit-ft",
            Self::DepositNft { .. } => "deposit-nft",
            Self::DepositSft { .. } => "deposit-sft",
            Self::StxTransfer { .. } => "stx-transfer",
            Self::StxTransferMany { .. } => "stx-transfer-many",
            Self::Sip009Transfer { .. } => "sip009-transfer",
            Self::Sip009TransferMany { .. } => "sip009-transfer-many",
            Self::Sip010Transfer { .. } => "sip010-transfer",
            Self::Sip010TransferMany { .. } => "sip010-transfer-many",
            Self::Sip013Transfer { .. } => "sip013-transfer",
            Self::Sip013TransferMany { .. } => "sip013-transfer-many",
            Self::SaleStart { .. } => "sale-start",
            Self::SaleBuy { .. } => "sale-buy",
            Self::SaleClaim { .. } => "sale-claim",
            Self::SaleRefund { .. } => "sale-refund",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_reads_from_scenario_json() {
        let json = r#"{"vote": {"amount": 500, "for": true,
            "proposal": "ST1D.edp003", "token": "ST1D.edao-token", "sender": "ST1WARD"}}"#;
        let tx: Tx = serde_json::from_str(json).unwrap();
        assert_eq!(tx.name(), "vote");
        assert_eq!(tx.sender(), &Principal::new("ST1WARD"));
        assert!(matches!(tx, Tx::Vote { in_favour: true, amount: 500, .. }));
    }

    #[test]
    fn single_transfer_nests_its_fields() {
        let json = r#"{"stx-transfer": {"transfer": {"amount": 100, "recipient": "ST1DAISY",
            "memo": "I claim the funds"}, "sender": "ST1DEPLOYER"}}"#;
        let tx: Tx = serde_json::from_str(json).unwrap();
        match tx {
            Tx::StxTransfer { transfer, .. } => {
                assert_eq!(transfer.amount, 100);
                assert_eq!(transfer.memo.as_deref(), Some("I claim the funds"));
            }
            other => panic!("unexpected tx {other:?}"),
        }
    }

    #[test]
    fn start_height_is_a_plain_number() {
        let json = r#"{"propose": {"proposal": "ST1D.edp003", "start_height": 146,
            "token": "ST1D.edao-token", "sender": "ST1PHIL"}}"#;
        let tx: Tx = serde_json::from_str(json).unwrap();
        assert!(matches!(tx, Tx::Propose { start_height, .. } if start_height == BlockHeight::new(146)));
    }
}
