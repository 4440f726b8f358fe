//! Governance and sale parameters.
//!
//! Durations are in blocks. Every field can be set from the TOML config, so
//! token amounts here are 64-bit; the submission parameters can also be
//! changed later by a passed proposal.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Parameters of proposal submission and voting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceParams {
    // ── Submission ───────────────────────────────────────────────────────
    /// Number of blocks a proposal accepts votes for.
    pub proposal_duration: u64,

    /// Minimum distance between submission and start height.
    pub minimum_proposal_start_delay: u64,

    /// Maximum distance between submission and start height.
    pub maximum_proposal_start_delay: u64,

    /// Governance-token balance a proposer must hold (0 disables the check).
    pub propose_threshold: u64,

    // ── Voting ───────────────────────────────────────────────────────────
    /// Rescinding cast votes is refused once fewer than this many blocks
    /// remain before the end height.
    pub rescind_time_lock: u64,

    /// Share of cast votes that must be "for" (strictly greater than), in
    /// basis points. 5000 = simple majority.
    pub pass_threshold_bps: u32,

    /// Minimum total votes cast for a proposal to be able to pass.
    pub quorum: u64,
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            proposal_duration: 1440,
            minimum_proposal_start_delay: 144,
            maximum_proposal_start_delay: 1008,
            propose_threshold: 0,
            rescind_time_lock: 289,
            pass_threshold_bps: 5000,
            quorum: 0,
        }
    }
}

impl GovernanceParams {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), TypesError> {
        if u128::from(self.pass_threshold_bps) > BPS_DENOMINATOR {
            return Err(TypesError::InvalidThreshold(self.pass_threshold_bps));
        }
        Ok(())
    }

    /// Whether a tally passes under these parameters.
    ///
    /// Passes iff the total meets the quorum and
    /// `for * 10_000 > total * pass_threshold_bps`.
    pub fn passes(&self, votes_for: u128, votes_against: u128) -> bool {
        let total = votes_for.saturating_add(votes_against);
        if total < u128::from(self.quorum) || total == 0 {
            return false;
        }
        let lhs = votes_for.saturating_mul(BPS_DENOMINATOR);
        let rhs = total.saturating_mul(u128::from(self.pass_threshold_bps));
        lhs > rhs
    }
}

/// Parameters of the token sale extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleParams {
    /// Number of blocks the sale runs for once started.
    pub duration: u64,

    /// Price of one governance token, in micro-STX.
    pub price_per_token: u64,

    /// Total allocation required for the sale to succeed.
    pub minimum_sale_amount: u64,

    /// Maximum allocation per buyer (0 = unlimited).
    pub maximum_allocation: u64,
}

impl Default for SaleParams {
    fn default() -> Self {
        Self {
            duration: 1440,
            price_per_token: 1,
            minimum_sale_amount: 0,
            maximum_allocation: 0,
        }
    }
}
