//! EDAO node: the DAO core and the chain simulator driving every engine.
//!
//! The node is the coordinator that:
//! - Holds the DAO core, its extensions and the executed-proposal record
//! - Runs proposal contracts with the DAO as caller
//! - Interprets transactions against the token, voting, submission,
//!   treasury and sale engines
//! - Mines blocks with per-transaction rollback and publishes events

pub mod chain;
pub mod config;
pub mod dao;
pub mod error;
pub mod event;
pub mod proposal;
pub mod receipt;
pub mod state;
pub mod tx;

pub use chain::Chain;
pub use config::{GenesisAllocation, GenesisConfig, NodeConfig};
pub use dao::{DaoCore, DaoError, DaoEvent, DaoSnapshot};
pub use error::{NodeError, TxError};
pub use event::{ChainEvent, EventBus};
pub use proposal::{Allocation, ProposalAction, ProposalContract};
pub use receipt::{Block, Receipt, TxFailure, Value};
pub use state::{Contracts, DaoState, StateSnapshot};
pub use tx::Tx;
