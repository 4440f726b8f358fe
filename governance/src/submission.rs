//! Proposal submission extension.
//!
//! Validates the start height against the configured delay window and the
//! proposer's balance against the propose threshold, then registers the
//! proposal with the voting engine for `proposal_duration` blocks.

use crate::error::SubmissionError;
use crate::params::SubmissionParameter;
use crate::voting::VotingEngine;
use edao_token::GovernanceToken;
use edao_types::{Authority, BlockHeight, GovernanceParams, Principal};
use tracing::{debug, info};

/// A `propose` call: which proposal, when it opens, and who submits it
/// against which token.
#[derive(Clone, Copy, Debug)]
pub struct ProposalRequest<'a> {
    pub proposal: &'a Principal,
    pub start_height: BlockHeight,
    pub token: &'a Principal,
    pub proposer: &'a Principal,
}

#[derive(Clone, Debug)]
pub struct ProposalSubmission {
    principal: Principal,
    token: Principal,
    params: GovernanceParams,
}

impl ProposalSubmission {
    pub fn new(principal: Principal, token: Principal, params: GovernanceParams) -> Self {
        Self {
            principal,
            token,
            params,
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

    pub fn get_parameter(&self, name: &str) -> Result<u128, SubmissionError> {
        SubmissionParameter::from_name(name)
            .map(|p| p.get(&self.params))
            .ok_or_else(|| SubmissionError::UnknownParameter(name.to_string()))
    }

    /// Change a parameter. DAO only.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: u128,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), SubmissionError> {
        if !auth.is_dao_or_extension(caller) {
            return Err(SubmissionError::Unauthorised);
        }
        let param = SubmissionParameter::from_name(name)
            .ok_or_else(|| SubmissionError::UnknownParameter(name.to_string()))?;
        param.set(&mut self.params, value);
        info!(parameter = name, value, "submission parameter set");
        Ok(())
    }

    /// Submit `request.proposal` to start voting at `request.start_height`.
    pub fn propose(
        &self,
        request: ProposalRequest<'_>,
        ledger: &GovernanceToken,
        voting: &mut VotingEngine,
        auth: &impl Authority,
        height: BlockHeight,
    ) -> Result<(), SubmissionError> {
        let ProposalRequest {
            proposal,
            start_height,
            token,
            proposer,
        } = request;
        if token != &self.token {
            return Err(SubmissionError::NotGovernanceToken);
        }
        let earliest = height.saturating_add(self.params.minimum_proposal_start_delay);
        if start_height < earliest {
            return Err(SubmissionError::ProposalMinimumStartDelay {
                start: start_height.as_u64(),
                earliest: earliest.as_u64(),
            });
        }
        let latest = height.saturating_add(self.params.maximum_proposal_start_delay);
        if start_height > latest {
            return Err(SubmissionError::ProposalMaximumStartDelay {
                start: start_height.as_u64(),
                latest: latest.as_u64(),
            });
        }
        let have = ledger.get_balance(proposer);
        let need = u128::from(self.params.propose_threshold);
        if have < need {
            return Err(SubmissionError::InsufficientBalance { have, need });
        }
        let end = start_height.saturating_add(self.params.proposal_duration);
        debug!(%proposal, %proposer, %start_height, %end, "proposal submitted");
        voting.add_proposal(proposal, start_height, end, proposer, &self.principal, auth)?;
        Ok(())
    }
}
