//! The DAO state: every engine, the deployed proposal contracts, and the
//! transaction interpreter that routes calls between them.
//!
//! Privileged calls are checked against the [`DaoCore`], which authorises
//! the DAO principal and every enabled extension.

use edao_governance::{
    ProposalRequest, ProposalSubmission, VoteDirection, VotingEngine, VotingSnapshot,
};
use edao_sale::{SaleSnapshot, TokenSale};
use edao_token::{GovernanceToken, TokenMetadata, TokenSnapshot};
use edao_treasury::{Asset, Treasury, TreasurySnapshot};
use edao_types::{BlockHeight, GovernanceParams, Principal, SaleParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::dao::{DaoCore, DaoError, DaoSnapshot};
use crate::error::TxError;
use crate::event::ChainEvent;
use crate::proposal::{ProposalAction, ProposalContract};
use crate::receipt::Value;
use crate::tx::Tx;

/// Contract principals of one deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contracts {
    pub core: Principal,
    pub token: Principal,
    pub voting: Principal,
    pub submission: Principal,
    pub treasury: Principal,
    pub sale: Principal,
}

impl Contracts {
    pub const CORE: &'static str = "edao-core";
    pub const TOKEN: &'static str = "edao-token";
    pub const VOTING: &'static str = "edao-voting";
    pub const SUBMISSION: &'static str = "edao-submission";
    pub const TREASURY: &'static str = "edao-treasury";
    pub const SALE: &'static str = "edao-sale";

    pub fn for_deployer(deployer: &Principal) -> Self {
        Self {
            core: Principal::contract(deployer, Self::CORE),
            token: Principal::contract(deployer, Self::TOKEN),
            voting: Principal::contract(deployer, Self::VOTING),
            submission: Principal::contract(deployer, Self::SUBMISSION),
            treasury: Principal::contract(deployer, Self::TREASURY),
            sale: Principal::contract(deployer, Self::SALE),
        }
    }

    /// Extensions the bootstrap proposal enables.
    pub fn bootstrap_extensions(&self) -> [Principal; 3] {
        [
            self.token.clone(),
            self.voting.clone(),
            self.submission.clone(),
        ]
    }
}

#[derive(Clone, Debug)]
pub struct DaoState {
    contracts: Contracts,
    dao: DaoCore,
    token: GovernanceToken,
    voting: VotingEngine,
    submission: ProposalSubmission,
    treasury: Treasury,
    sale: TokenSale,
    proposals: BTreeMap<Principal, ProposalContract>,
}

/// Serialisable [`DaoState`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub contracts: Contracts,
    pub dao: DaoSnapshot,
    pub token: TokenSnapshot,
    pub voting: VotingSnapshot,
    pub submission_params: GovernanceParams,
    pub treasury: TreasurySnapshot,
    pub sale: SaleSnapshot,
    pub proposals: Vec<ProposalContract>,
}

impl DaoState {
    pub fn new(
        deployer: &Principal,
        governance: GovernanceParams,
        sale: SaleParams,
        metadata: TokenMetadata,
    ) -> Self {
        let contracts = Contracts::for_deployer(deployer);
        Self {
            dao: DaoCore::new(contracts.core.clone(), deployer.clone()),
            token: GovernanceToken::new(contracts.token.clone(), metadata),
            voting: VotingEngine::new(
                contracts.voting.clone(),
                contracts.token.clone(),
                governance.clone(),
            ),
            submission: ProposalSubmission::new(
                contracts.submission.clone(),
                contracts.token.clone(),
                governance,
            ),
            treasury: Treasury::new(contracts.treasury.clone()),
            sale: TokenSale::new(contracts.sale.clone(), sale),
            proposals: BTreeMap::new(),
            contracts,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    pub fn dao(&self) -> &DaoCore {
        &self.dao
    }

    pub fn token(&self) -> &GovernanceToken {
        &self.token
    }

    pub fn voting(&self) -> &VotingEngine {
        &self.voting
    }

    pub fn submission(&self) -> &ProposalSubmission {
        &self.submission
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    pub fn sale(&self) -> &TokenSale {
        &self.sale
    }

    pub fn proposal_contract(&self, principal: &Principal) -> Option<&ProposalContract> {
        self.proposals.get(principal)
    }

    /// Register a proposal contract. Returns `false` if one with the same
    /// principal is already deployed.
    pub fn deploy(&mut self, contract: ProposalContract) -> bool {
        if self.proposals.contains_key(&contract.principal) {
            return false;
        }
        self.proposals.insert(contract.principal.clone(), contract);
        true
    }

    /// Drain every engine's events, grouped by contract.
    pub fn drain_events(&mut self) -> Vec<ChainEvent> {
        let mut events: Vec<ChainEvent> = Vec::new();
        events.extend(self.dao.take_events().into_iter().map(ChainEvent::Dao));
        events.extend(self.token.take_events().into_iter().map(ChainEvent::Token));
        events.extend(self.voting.take_events().into_iter().map(ChainEvent::Voting));
        events.extend(self.treasury.take_events().into_iter().map(ChainEvent::Treasury));
        events.extend(self.sale.take_events().into_iter().map(ChainEvent::Sale));
        events
    }

    // ── Interpreter ──────────────────────────────────────────────────────

    /// Apply one transaction at `height`.
    ///
    /// On error the state may be partially mutated; the caller restores a
    /// snapshot taken before the call.
    pub fn apply(&mut self, tx: &Tx, height: BlockHeight) -> Result<Value, TxError> {
        let ok = Ok(Value::Bool(true));
        match tx {
            // DAO core
            Tx::Construct { bootstrap, sender } => {
                self.dao.construct(bootstrap, sender, height)?;
                self.run_proposal(bootstrap, height)?;
                ok
            }
            Tx::SetExtension {
                extension,
                enabled,
                sender,
            } => {
                self.dao.set_extension(extension, *enabled, sender)?;
                ok
            }
            Tx::Execute { proposal, sender } => {
                self.dao.execute(proposal, sender, height)?;
                self.run_proposal(proposal, height)?;
                ok
            }

            // Governance token
            Tx::Transfer {
                amount,
                from,
                recipient,
                memo,
                sender,
            } => {
                self.token
                    .transfer(*amount, from, recipient, memo.clone(), sender, &self.dao)?;
                ok
            }
            Tx::EdgTransfer {
                amount,
                from,
                recipient,
                sender,
            } => {
                self.token
                    .edg_transfer(*amount, from, recipient, sender, &self.dao)?;
                ok
            }
            Tx::Delegate {
                amount,
                delegate,
                delegator,
                sender,
            } => {
                self.token
                    .edg_delegate(*amount, delegate, delegator, sender, &self.dao)?;
                ok
            }
            Tx::Rescind {
                amount,
                delegate,
                delegator,
                sender,
            } => {
                let returned = self
                    .token
                    .edg_rescind(*amount, delegate, delegator, sender, &self.dao)?;
                Ok(Value::UInt(returned))
            }
            Tx::SetTransferLock { locked, sender } => {
                self.token.set_transfer_lock(*locked, sender, &self.dao)?;
                ok
            }
            Tx::EdgMint {
                amount,
                recipient,
                sender,
            } => {
                self.token.edg_mint(*amount, recipient, sender, &self.dao)?;
                ok
            }
            Tx::EdgBurn {
                amount,
                owner,
                sender,
            } => {
                self.token.edg_burn(*amount, owner, sender, &self.dao)?;
                ok
            }

            // Submission and voting
            Tx::Propose {
                proposal,
                start_height,
                token,
                sender,
            } => {
                let request = ProposalRequest {
                    proposal,
                    start_height: *start_height,
                    token,
                    proposer: sender,
                };
                self.submission.propose(
                    request,
                    &self.token,
                    &mut self.voting,
                    &self.dao,
                    height,
                )?;
                self.ensure_deployed(proposal)?;
                ok
            }
            Tx::SetParameter {
                parameter,
                value,
                sender,
            } => {
                self.submission
                    .set_parameter(parameter, *value, sender, &self.dao)?;
                ok
            }
            Tx::Vote {
                amount,
                in_favour,
                proposal,
                token,
                sender,
            } => {
                self.voting.vote(
                    *amount,
                    VoteDirection::from_bool(*in_favour),
                    proposal,
                    token,
                    sender,
                    &mut self.token,
                    &self.dao,
                    height,
                )?;
                ok
            }
            Tx::RescindVotes {
                amount,
                in_favour,
                proxy,
                proposal,
                token,
                sender,
            } => {
                let returned = self.voting.rescind_votes(
                    *amount,
                    VoteDirection::from_bool(*in_favour),
                    proxy,
                    proposal,
                    token,
                    sender,
                    &mut self.token,
                    &self.dao,
                    height,
                )?;
                Ok(Value::UInt(returned))
            }
            Tx::ReclaimVotes {
                proposal,
                token,
                sender,
            } => {
                let reclaimed =
                    self.voting
                        .reclaim_votes(proposal, token, sender, &mut self.token, &self.dao, height)?;
                Ok(Value::Bool(reclaimed))
            }
            Tx::Conclude { proposal, sender } => {
                let passed = self.voting.conclude(proposal, height)?;
                debug!(%proposal, %sender, passed, "conclude");
                if passed {
                    let voting = self.contracts.voting.clone();
                    self.dao.execute(proposal, &voting, height)?;
                    self.run_proposal(proposal, height)?;
                }
                Ok(Value::Bool(passed))
            }

            // Treasury
            Tx::DepositStx { amount, sender } => {
                self.treasury.deposit(Asset::Stx, *amount, sender)?;
                ok
            }
            Tx::DepositFt {
                asset,
                amount,
                sender,
            } => {
                if asset == self.token.principal() {
                    let treasury = self.contracts.treasury.clone();
                    self.token
                        .transfer(*amount, sender, &treasury, None, sender, &self.dao)?;
                } else {
                    let ft = Asset::Ft {
                        contract: asset.clone(),
                    };
                    self.treasury.deposit(ft, *amount, sender)?;
                }
                ok
            }
            Tx::DepositNft {
                asset,
                token_id,
                sender,
            } => {
                let nft = Asset::Nft {
                    contract: asset.clone(),
                    id: *token_id,
                };
                self.treasury.deposit(nft, 1, sender)?;
                ok
            }
            Tx::DepositSft {
                asset,
                token_id,
                amount,
                sender,
            } => {
                let sft = Asset::Sft {
                    contract: asset.clone(),
                    id: *token_id,
                };
                self.treasury.deposit(sft, *amount, sender)?;
                ok
            }
            Tx::StxTransfer { transfer, sender } => {
                self.treasury.stx_transfer(transfer, sender, &self.dao)?;
                ok
            }
            Tx::StxTransferMany { transfers, sender } => {
                self.treasury.stx_transfer_many(transfers, sender, &self.dao)?;
                ok
            }
            Tx::Sip009Transfer {
                transfer,
                asset,
                sender,
            } => {
                self.treasury
                    .sip009_transfer(transfer, asset, sender, &self.dao)?;
                ok
            }
            Tx::Sip009TransferMany {
                transfers,
                asset,
                sender,
            } => {
                self.treasury
                    .sip009_transfer_many(transfers, asset, sender, &self.dao)?;
                ok
            }
            Tx::Sip010Transfer {
                transfer,
                asset,
                sender,
            } => {
                self.treasury
                    .sip010_transfer(transfer, asset, &mut self.token, sender, &self.dao)?;
                ok
            }
            Tx::Sip010TransferMany {
                transfers,
                asset,
                sender,
            } => {
                self.treasury.sip010_transfer_many(
                    transfers,
                    asset,
                    &mut self.token,
                    sender,
                    &self.dao,
                )?;
                ok
            }
            Tx::Sip013Transfer {
                transfer,
                asset,
                sender,
            } => {
                self.treasury
                    .sip013_transfer(transfer, asset, sender, &self.dao)?;
                ok
            }
            Tx::Sip013TransferMany {
                transfers,
                asset,
                sender,
            } => {
                self.treasury
                    .sip013_transfer_many(transfers, asset, sender, &self.dao)?;
                ok
            }

            // Token sale
            Tx::SaleStart { sender } => {
                self.sale.start(sender, height)?;
                ok
            }
            Tx::SaleBuy { amount, sender } => {
                self.sale.buy(*amount, sender, height)?;
                ok
            }
            Tx::SaleClaim { sender } => {
                self.sale.claim(sender, &mut self.token, &self.dao, height)?;
                ok
            }
            Tx::SaleRefund { sender } => {
                let refunded = self.sale.refund(sender, height)?;
                Ok(Value::UInt(refunded))
            }
        }
    }

    fn ensure_deployed(&self, proposal: &Principal) -> Result<(), DaoError> {
        if self.proposals.contains_key(proposal) {
            Ok(())
        } else {
            Err(DaoError::UnknownProposal(proposal.to_string()))
        }
    }

    /// Run a proposal's actions with the DAO as caller.
    fn run_proposal(&mut self, proposal: &Principal, height: BlockHeight) -> Result<(), TxError> {
        self.ensure_deployed(proposal)?;
        let actions = self
            .proposals
            .get(proposal)
            .map(|c| c.actions.clone())
            .unwrap_or_default();
        let dao = self.contracts.core.clone();
        for action in &actions {
            self.run_action(action, &dao, height)?;
        }
        debug!(%proposal, actions = actions.len(), "proposal actions run");
        Ok(())
    }

    fn run_action(
        &mut self,
        action: &ProposalAction,
        dao: &Principal,
        height: BlockHeight,
    ) -> Result<(), TxError> {
        match action {
            ProposalAction::SetExtension { extension, enabled } => {
                self.dao.set_extension(extension, *enabled, dao)?;
            }
            ProposalAction::SetTransferLock { locked } => {
                self.token.set_transfer_lock(*locked, dao, &self.dao)?;
            }
            ProposalAction::Mint { amount, recipient } => {
                self.token.edg_mint(*amount, recipient, dao, &self.dao)?;
            }
            ProposalAction::MintMany { allocations } => {
                let recipients: Vec<_> = allocations
                    .iter()
                    .map(|a| (a.amount, a.recipient.clone()))
                    .collect();
                self.token.edg_mint_many(&recipients, dao, &self.dao)?;
            }
            ProposalAction::Burn { amount, owner } => {
                self.token.edg_burn(*amount, owner, dao, &self.dao)?;
            }
            ProposalAction::EdgTransfer {
                amount,
                sender,
                recipient,
            } => {
                self.token
                    .edg_transfer(*amount, sender, recipient, dao, &self.dao)?;
            }
            ProposalAction::SetSubmissionParameter { parameter, value } => {
                self.submission
                    .set_parameter(parameter, *value, dao, &self.dao)?;
            }
            ProposalAction::StxTransfer { transfers } => {
                self.treasury.stx_transfer_many(transfers, dao, &self.dao)?;
            }
            ProposalAction::Sip009Transfer { asset, transfers } => {
                self.treasury
                    .sip009_transfer_many(transfers, asset, dao, &self.dao)?;
            }
            ProposalAction::Sip010Transfer { asset, transfers } => {
                self.treasury.sip010_transfer_many(
                    transfers,
                    asset,
                    &mut self.token,
                    dao,
                    &self.dao,
                )?;
            }
            ProposalAction::Sip013Transfer { asset, transfers } => {
                self.treasury
                    .sip013_transfer_many(transfers, asset, dao, &self.dao)?;
            }
            ProposalAction::WithdrawSaleProceeds => {
                let treasury = self.contracts.treasury.clone();
                let amount = self
                    .sale
                    .withdraw_proceeds(&treasury, dao, &self.dao, height)?;
                let sale = self.contracts.sale.clone();
                self.treasury.deposit(Asset::Stx, amount, &sale)?;
            }
        }
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            contracts: self.contracts.clone(),
            dao: self.dao.snapshot(),
            token: self.token.snapshot(),
            voting: self.voting.snapshot(),
            submission_params: self.submission.params().clone(),
            treasury: self.treasury.snapshot(),
            sale: self.sale.snapshot(),
            proposals: self.proposals.values().cloned().collect(),
        }
    }

    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        let contracts = snapshot.contracts;
        Self {
            dao: DaoCore::from_snapshot(snapshot.dao),
            token: GovernanceToken::from_snapshot(snapshot.token),
            voting: VotingEngine::from_snapshot(snapshot.voting),
            submission: ProposalSubmission::new(
                contracts.submission.clone(),
                contracts.token.clone(),
                snapshot.submission_params,
            ),
            treasury: Treasury::from_snapshot(snapshot.treasury),
            sale: TokenSale::from_snapshot(snapshot.sale),
            proposals: snapshot
                .proposals
                .into_iter()
                .map(|c| (c.principal.clone(), c))
                .collect(),
            contracts,
        }
    }
}
