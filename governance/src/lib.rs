//! Governance for the EDAO: proposal voting and submission.
//!
//! Proposals move Pending → Active → Ended → Concluded purely by block
//! height, apart from the final step which requires an explicit `conclude`.
//! Votes are governance tokens locked for the life of the vote; delegators
//! can pull delegated tokens back out of a live vote until the rescind time
//! lock closes.

pub mod error;
pub mod event;
pub mod params;
pub mod proposal;
pub mod submission;
pub mod voting;

pub use error::{SubmissionError, VotingError};
pub use event::VotingEvent;
pub use params::SubmissionParameter;
pub use proposal::{Proposal, ProposalStatus, VoteDirection, VoteRecord};
pub use submission::{ProposalRequest, ProposalSubmission};
pub use voting::{VotingEngine, VotingSnapshot};
