//! Submission parameters adjustable by the DAO.

use edao_types::GovernanceParams;
use serde::{Deserialize, Serialize};

/// A parameter of the proposal submission extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionParameter {
    ProposalDuration,
    MinimumProposalStartDelay,
    MaximumProposalStartDelay,
    ProposeThreshold,
}

impl SubmissionParameter {
    pub const ALL: [Self; 4] = [
        Self::ProposalDuration,
        Self::MinimumProposalStartDelay,
        Self::MaximumProposalStartDelay,
        Self::ProposeThreshold,
    ];

    /// On-chain name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProposalDuration => "proposal-duration",
            Self::MinimumProposalStartDelay => "minimum-proposal-start-delay",
            Self::MaximumProposalStartDelay => "maximum-proposal-start-delay",
            Self::ProposeThreshold => "propose-threshold",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn get(&self, params: &GovernanceParams) -> u128 {
        match self {
            Self::ProposalDuration => params.proposal_duration.into(),
            Self::MinimumProposalStartDelay => params.minimum_proposal_start_delay.into(),
            Self::MaximumProposalStartDelay => params.maximum_proposal_start_delay.into(),
            Self::ProposeThreshold => params.propose_threshold.into(),
        }
    }

    /// Values saturate at `u64::MAX`.
    pub fn set(&self, params: &mut GovernanceParams, value: u128) {
        let value = u64::try_from(value).unwrap_or(u64::MAX);
        match self {
            Self::ProposalDuration => params.proposal_duration = value,
            Self::MinimumProposalStartDelay => params.minimum_proposal_start_delay = value,
            Self::MaximumProposalStartDelay => params.maximum_proposal_start_delay = value,
            Self::ProposeThreshold => params.propose_threshold = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for p in SubmissionParameter::ALL {
            assert_eq!(SubmissionParameter::from_name(p.name()), Some(p));
        }
        assert_eq!(SubmissionParameter::from_name("quorum"), None);
    }

    #[test]
    fn defaults_are_readable() {
        let params = GovernanceParams::default();
        assert_eq!(SubmissionParameter::ProposalDuration.get(&params), 1440);
        assert_eq!(SubmissionParameter::MinimumProposalStartDelay.get(&params), 144);
        assert_eq!(SubmissionParameter::MaximumProposalStartDelay.get(&params), 1008);
        assert_eq!(SubmissionParameter::ProposeThreshold.get(&params), 0);
    }
}
