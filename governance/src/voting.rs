//! Proposal voting engine.
//!
//! Votes are governance tokens locked on the voter's account for as long as
//! the vote counts. A delegate votes with own plus delegated custody; while a
//! proposal is live (and outside the rescind time lock) a delegator can pull
//! delegated tokens back out of the delegate's cast votes, which reduces the
//! tally before the tokens travel home through the ledger's rescind path.
//!
//! Every operation takes the ledger and the current height explicitly.

use crate::error::VotingError;
use crate::event::VotingEvent;
use crate::proposal::{Proposal, ProposalStatus, VoteDirection, VoteRecord};
use edao_token::GovernanceToken;
use edao_types::{Authority, BlockHeight, GovernanceParams, Principal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct VotingEngine {
    principal: Principal,
    token: Principal,
    params: GovernanceParams,
    proposals: BTreeMap<Principal, Proposal>,
    /// (proposal, voter) -> amounts currently cast.
    votes: HashMap<(Principal, Principal), VoteRecord>,
    events: Vec<VotingEvent>,
}

impl VotingEngine {
    /// `principal` is this engine's own contract principal (the caller it
    /// presents to the ledger); `token` is the only token it accepts votes in.
    pub fn new(principal: Principal, token: Principal, params: GovernanceParams) -> Self {
        Self {
            principal,
            token,
            params,
            proposals: BTreeMap::new(),
            votes: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn token(&self) -> &Principal {
        &self.token
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn get_proposal_data(&self, proposal: &Principal) -> Option<&Proposal> {
        self.proposals.get(proposal)
    }

    pub fn proposals(&self) -> impl Iterator<Item = (&Principal, &Proposal)> {
        self.proposals.iter()
    }

    /// What `voter` currently has cast on `proposal`.
    pub fn get_current_total_votes(&self, proposal: &Principal, voter: &Principal) -> VoteRecord {
        self.votes
            .get(&(proposal.clone(), voter.clone()))
            .copied()
            .unwrap_or_default()
    }

    pub fn status(&self, proposal: &Principal, height: BlockHeight) -> Option<ProposalStatus> {
        self.proposals.get(proposal).map(|p| p.status(height))
    }

    pub fn take_events(&mut self) -> Vec<VotingEvent> {
        std::mem::take(&mut self.events)
    }

    fn check_token(&self, token: &Principal) -> Result<(), VotingError> {
        if token == &self.token {
            Ok(())
        } else {
            Err(VotingError::NotGovernanceToken)
        }
    }

    fn proposal(&self, proposal: &Principal) -> Result<&Proposal, VotingError> {
        self.proposals
            .get(proposal)
            .ok_or_else(|| VotingError::UnknownProposal(proposal.to_string()))
    }

    // ── Registration ─────────────────────────────────────────────────────

    /// Register a proposal. Only extensions (the submission contract) may.
    pub fn add_proposal(
        &mut self,
        proposal: &Principal,
        start: BlockHeight,
        end: BlockHeight,
        proposer: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), VotingError> {
        if !auth.is_dao_or_extension(caller) {
            return Err(VotingError::Unauthorised);
        }
        if self.proposals.contains_key(proposal) {
            return Err(VotingError::ProposalAlreadyExists(proposal.to_string()));
        }
        self.proposals
            .insert(proposal.clone(), Proposal::new(proposer.clone(), start, end));
        info!(%proposal, %proposer, %start, %end, "proposal added");
        self.events.push(VotingEvent::Propose {
            proposal: proposal.clone(),
            proposer: proposer.clone(),
            start_block_height: start,
            end_block_height: end,
        });
        Ok(())
    }

    // ── Voting ───────────────────────────────────────────────────────────

    /// Cast `amount` on `proposal`, locking it on the voter's account.
    ///
    /// A voter may cast in both directions; each is tracked separately.
    #[allow(clippy::too_many_arguments)]
    pub fn vote(
        &mut self,
        amount: u128,
        direction: VoteDirection,
        proposal: &Principal,
        token: &Principal,
        voter: &Principal,
        ledger: &mut GovernanceToken,
        auth: &impl Authority,
        height: BlockHeight,
    ) -> Result<(), VotingError> {
        self.check_token(token)?;
        if self.proposal(proposal)?.status(height) != ProposalStatus::Active {
            return Err(VotingError::ProposalInactive);
        }
        ledger.edg_lock(amount, voter, &self.principal, auth)?;

        if let Some(data) = self.proposals.get_mut(proposal) {
            let tally = data.tally_mut(direction);
            *tally = tally.saturating_add(amount);
        }
        let record = self
            .votes
            .entry((proposal.clone(), voter.clone()))
            .or_default();
        let cast = record.cast_mut(direction);
        *cast = cast.saturating_add(amount);

        debug!(%proposal, %voter, ?direction, amount, "vote cast");
        self.events.push(VotingEvent::Vote {
            proposal: proposal.clone(),
            voter: voter.clone(),
            direction,
            amount,
        });
        Ok(())
    }

    /// Pull up to `amount` of `delegator`'s delegated tokens out of the
    /// votes `proxy` cast on a live proposal and return them to the
    /// delegator.
    ///
    /// The realised amount is `min(amount, cast)` and is returned. The tally
    /// and the proxy's cast record drop by it, the proxy's lock is released
    /// by it, and the tokens go back through the ledger's rescind path.
    #[allow(clippy::too_many_arguments)]
    pub fn rescind_votes(
        &mut self,
        amount: u128,
        direction: VoteDirection,
        proxy: &Principal,
        proposal: &Principal,
        token: &Principal,
        delegator: &Principal,
        ledger: &mut GovernanceToken,
        auth: &impl Authority,
        height: BlockHeight,
    ) -> Result<u128, VotingError> {
        self.check_token(token)?;
        let data = self.proposal(proposal)?;
        if data.concluded {
            return Err(VotingError::ProposalAlreadyConcluded);
        }
        let remaining = height.blocks_until(data.end_block_height);
        if remaining < self.params.rescind_time_lock {
            return Err(VotingError::RescindTimeLockActive {
                remaining,
                lock: self.params.rescind_time_lock,
            });
        }
        let key = (proposal.clone(), proxy.clone());
        let cast = self
            .votes
            .get(&key)
            .map(|r| r.cast(direction))
            .unwrap_or(0);
        if cast == 0 {
            return Err(VotingError::RescindingMoreThanCast);
        }
        let effective = amount.min(cast);
        let delegated = ledger.get_delegating(delegator, proxy);
        if effective > delegated {
            return Err(VotingError::RescindingMoreThanDelegated {
                requested: effective,
                delegated,
            });
        }

        ledger.edg_unlock(effective, proxy, &self.principal, auth)?;
        let returned = ledger.edg_rescind(effective, proxy, delegator, &self.principal, auth)?;

        if let Some(data) = self.proposals.get_mut(proposal) {
            let tally = data.tally_mut(direction);
            *tally = tally.saturating_sub(effective);
        }
        if let Some(record) = self.votes.get_mut(&key) {
            let cast = record.cast_mut(direction);
            *cast = cast.saturating_sub(effective);
            if record.is_empty() {
                self.votes.remove(&key);
            }
        }

        debug!(%proposal, %proxy, %delegator, ?direction, requested = amount, returned, "votes rescinded");
        Ok(returned)
    }

    /// Unlock everything `voter` still has cast on a proposal that has
    /// ended. Returns `false` (and changes nothing) when nothing remains.
    pub fn reclaim_votes(
        &mut self,
        proposal: &Principal,
        token: &Principal,
        voter: &Principal,
        ledger: &mut GovernanceToken,
        auth: &impl Authority,
        height: BlockHeight,
    ) -> Result<bool, VotingError> {
        self.check_token(token)?;
        match self.proposal(proposal)?.status(height) {
            ProposalStatus::Pending | ProposalStatus::Active => {
                return Err(VotingError::ProposalNotConcluded)
            }
            ProposalStatus::Ended | ProposalStatus::Concluded => {}
        }
        let key = (proposal.clone(), voter.clone());
        let total = self.votes.get(&key).map(VoteRecord::total).unwrap_or(0);
        if total == 0 {
            return Ok(false);
        }
        ledger.edg_unlock(total, voter, &self.principal, auth)?;
        self.votes.remove(&key);
        debug!(%proposal, %voter, amount = total, "votes reclaimed");
        Ok(true)
    }

    /// Fix the outcome of an ended proposal. Returns whether it passed.
    ///
    /// Executing a passed proposal is the caller's job.
    pub fn conclude(
        &mut self,
        proposal: &Principal,
        height: BlockHeight,
    ) -> Result<bool, VotingError> {
        let data = self.proposal(proposal)?;
        match data.status(height) {
            ProposalStatus::Concluded => return Err(VotingError::ProposalAlreadyConcluded),
            ProposalStatus::Pending | ProposalStatus::Active => {
                return Err(VotingError::EndBlockHeightNotReached {
                    now: height.as_u64(),
                    end: data.end_block_height.as_u64(),
                })
            }
            ProposalStatus::Ended => {}
        }
        let passed = self.params.passes(data.votes_for, data.votes_against);
        if let Some(data) = self.proposals.get_mut(proposal) {
            data.concluded = true;
            data.passed = passed;
            info!(
                %proposal,
                votes_for = data.votes_for,
                votes_against = data.votes_against,
                passed,
                "proposal concluded"
            );
        }
        self.events.push(VotingEvent::Conclude {
            proposal: proposal.clone(),
            passed,
        });
        Ok(passed)
    }
}

/// Serializable snapshot of the voting engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingSnapshot {
    pub principal: Principal,
    pub token: Principal,
    pub params: GovernanceParams,
    pub proposals: Vec<(Principal, Proposal)>,
    pub votes: Vec<(Principal, Principal, VoteRecord)>,
}

impl VotingEngine {
    pub fn snapshot(&self) -> VotingSnapshot {
        let mut votes: Vec<_> = self
            .votes
            .iter()
            .map(|((proposal, voter), record)| (proposal.clone(), voter.clone(), *record))
            .collect();
        votes.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        VotingSnapshot {
            principal: self.principal.clone(),
            token: self.token.clone(),
            params: self.params.clone(),
            proposals: self
                .proposals
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            votes,
        }
    }

    pub fn from_snapshot(snapshot: VotingSnapshot) -> Self {
        Self {
            principal: snapshot.principal,
            token: snapshot.token,
            params: snapshot.params,
            proposals: snapshot.proposals.into_iter().collect(),
            votes: snapshot
                .votes
                .into_iter()
                .map(|(proposal, voter, record)| ((proposal, voter), record))
                .collect(),
            events: Vec::new(),
        }
    }

    pub fn save_state(&self) -> Result<Vec<u8>, VotingError> {
        bincode::serialize(&self.snapshot()).map_err(|e| VotingError::Snapshot(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, VotingError> {
        bincode::deserialize::<VotingSnapshot>(data)
            .map(Self::from_snapshot)
            .map_err(|e| VotingError::Snapshot(e.to_string()))
    }
}
