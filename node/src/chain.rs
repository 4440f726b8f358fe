//! The chain simulator: mines blocks of transactions against the DAO state.
//!
//! Each transaction runs against a copy of the state; the copy replaces the
//! live state only when the call succeeds, so a rejected call leaves no
//! trace. Receipts carry the events of accepted calls, which are also
//! published on the [`EventBus`].

use edao_types::{BlockHeight, Principal};
use edao_utils::ChainStats;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::NodeConfig;
use crate::event::{ChainEvent, EventBus};
use crate::proposal::ProposalContract;
use crate::receipt::{Block, Receipt, TxFailure};
use crate::state::{DaoState, StateSnapshot};
use crate::tx::Tx;
use crate::NodeError;

pub struct Chain {
    state: DaoState,
    /// Height the next mined block executes at.
    height: BlockHeight,
    bus: EventBus,
    stats: ChainStats,
}

#[derive(Serialize, Deserialize)]
struct ChainSnapshot {
    height: BlockHeight,
    state: StateSnapshot,
}

impl Chain {
    /// Deploy every contract and the bootstrap proposal. The DAO is not
    /// constructed yet; that takes a `construct` transaction from the
    /// deployer.
    pub fn new(config: &NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let mut state = DaoState::new(
            &config.deployer,
            config.governance.clone(),
            config.sale.clone(),
            config.token.clone(),
        );
        state.deploy(config.bootstrap_proposal());
        info!(
            deployer = %config.deployer,
            bootstrap = %config.bootstrap_principal(),
            "contracts deployed"
        );
        Ok(Self::with_state(state, BlockHeight::new(1)))
    }

    fn with_state(state: DaoState, height: BlockHeight) -> Self {
        Self {
            state,
            height,
            bus: EventBus::new(),
            stats: ChainStats::default(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn state(&self) -> &DaoState {
        &self.state
    }

    /// Height the next block executes at.
    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn stats(&self) -> ChainStats {
        self.stats
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ChainEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    /// Register a proposal contract so it can be proposed and executed.
    pub fn deploy_proposal(&mut self, contract: ProposalContract) -> Result<Principal, NodeError> {
        let principal = contract.principal.clone();
        if !self.state.deploy(contract) {
            return Err(NodeError::ProposalAlreadyDeployed(principal.to_string()));
        }
        debug!(proposal = %principal, "proposal deployed");
        Ok(principal)
    }

    // ── Mining ───────────────────────────────────────────────────────────

    /// Run `txs` in order at the current height, then advance by one.
    pub fn mine_block(&mut self, txs: Vec<Tx>) -> Block {
        let height = self.height;
        let mut receipts = Vec::with_capacity(txs.len());
        for tx in &txs {
            receipts.push(self.apply(tx, height));
        }
        self.height = height.saturating_add(1);
        self.stats.record_block();
        debug!(%height, txs = txs.len(), "block mined");
        Block { height, receipts }
    }

    fn apply(&mut self, tx: &Tx, height: BlockHeight) -> Receipt {
        let mut working = self.state.clone();
        match working.apply(tx, height) {
            Ok(value) => {
                let events = working.drain_events();
                self.state = working;
                for event in &events {
                    self.bus.emit(event);
                }
                self.stats.record_accepted(events.len());
                Receipt {
                    result: Ok(value),
                    events,
                }
            }
            Err(err) => {
                let failure = TxFailure::from(&err);
                warn!(
                    tx = tx.name(),
                    sender = %tx.sender(),
                    %height,
                    code = failure.code,
                    contract = failure.contract,
                    "transaction rejected: {err}"
                );
                self.stats.record_rejected();
                Receipt {
                    result: Err(failure),
                    events: Vec::new(),
                }
            }
        }
    }

    /// Advance the height by `count` blocks without transactions.
    pub fn mine_empty_block(&mut self, count: u64) {
        self.height = self.height.saturating_add(count);
        self.stats.record_empty_blocks(count);
    }

    /// Advance so the next block executes at `target`. No-op if already
    /// there or past it.
    pub fn mine_empty_block_until(&mut self, target: BlockHeight) {
        let skipped = self.height.blocks_until(target);
        self.mine_empty_block(skipped);
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Serialize the height and the full DAO state.
    pub fn save_state(&self) -> Result<Vec<u8>, NodeError> {
        let snapshot = ChainSnapshot {
            height: self.height,
            state: self.state.snapshot(),
        };
        bincode::serialize(&snapshot).map_err(|e| NodeError::State(e.to_string()))
    }

    /// Restore a chain saved with [`save_state`](Self::save_state).
    /// Subscribers and counters start empty.
    pub fn load_state(data: &[u8]) -> Result<Self, NodeError> {
        let snapshot: ChainSnapshot =
            bincode::deserialize(data).map_err(|e| NodeError::State(e.to_string()))?;
        Ok(Self::with_state(
            DaoState::from_snapshot(snapshot.state),
            snapshot.height,
        ))
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("height", &self.height)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn p(s: &str) -> Principal {
        Principal::new(s)
    }

    fn constructed() -> Chain {
        let config = NodeConfig::default();
        let mut chain = Chain::new(&config).unwrap();
        let block = chain.mine_block(vec![Tx::Construct {
            bootstrap: config.bootstrap_principal(),
            sender: config.deployer.clone(),
        }]);
        assert_eq!(block.receipts[0].ok_bool(), Some(true));
        chain
    }

    #[test]
    fn starts_at_height_one() {
        let chain = Chain::new(&NodeConfig::default()).unwrap();
        assert_eq!(chain.height(), BlockHeight::new(1));
        assert!(!chain.state().dao().is_constructed());
    }

    #[test]
    fn block_reports_the_height_it_ran_at() {
        let mut chain = Chain::new(&NodeConfig::default()).unwrap();
        let block = chain.mine_block(vec![]);
        assert_eq!(block.height, BlockHeight::new(1));
        assert_eq!(chain.height(), BlockHeight::new(2));
    }

    #[test]
    fn construct_runs_the_bootstrap() {
        let chain = constructed();
        let token = chain.state().token();
        assert_eq!(token.get_balance(&p("ST1DAISY")), 1000);
        assert_eq!(token.get_balance(&p("ST1WARD")), 0);
        assert_eq!(token.get_total_supply(), 4000);
        let contracts = chain.state().contracts();
        assert!(chain.state().dao().is_extension(&contracts.voting));
        assert!(!chain.state().dao().is_extension(&contracts.treasury));
    }

    #[test]
    fn rejected_tx_leaves_no_trace() {
        let mut chain = constructed();
        let block = chain.mine_block(vec![Tx::Transfer {
            amount: 5000,
            from: p("ST1DAISY"),
            recipient: p("ST1WARD"),
            memo: None,
            sender: p("ST1DAISY"),
        }]);
        let receipt = &block.receipts[0];
        assert!(receipt.err_code().is_some());
        assert!(receipt.events.is_empty());
        assert_eq!(chain.state().token().get_balance(&p("ST1DAISY")), 1000);
        assert_eq!(chain.stats().tx_rejected, 1);
        assert_eq!(chain.stats().tx_accepted, 0);
    }

    #[test]
    fn empty_blocks_advance_height() {
        let mut chain = Chain::new(&NodeConfig::default()).unwrap();
        chain.mine_empty_block(10);
        assert_eq!(chain.height(), BlockHeight::new(11));
        chain.mine_empty_block_until(BlockHeight::new(5));
        assert_eq!(chain.height(), BlockHeight::new(11));
        chain.mine_empty_block_until(BlockHeight::new(100));
        assert_eq!(chain.height(), BlockHeight::new(100));
        assert_eq!(chain.stats().empty_blocks, 99);
        assert_eq!(chain.stats().blocks, 0);
    }

    #[test]
    fn duplicate_proposal_deploy_is_refused() {
        let mut chain = Chain::new(&NodeConfig::default()).unwrap();
        let contract = ProposalContract::deployed_by(&p("ST1DEPLOYER"), "edp001", vec![]);
        chain.deploy_proposal(contract.clone()).unwrap();
        assert!(matches!(
            chain.deploy_proposal(contract),
            Err(NodeError::ProposalAlreadyDeployed(_))
        ));
    }

    #[test]
    fn subscribers_see_accepted_events() {
        let mut chain = Chain::new(&NodeConfig::default()).unwrap();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        chain.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        let block = chain.mine_block(vec![Tx::Construct {
            bootstrap: p("ST1DEPLOYER.edp000-bootstrap"),
            sender: p("ST1DEPLOYER"),
        }]);
        let emitted = block.receipts[0].events.len();
        assert!(emitted > 0);
        assert_eq!(seen.load(Ordering::Relaxed), emitted);
        assert_eq!(chain.stats().events, emitted as u64);
    }

    #[test]
    fn state_survives_save_and_load() {
        let mut chain = constructed();
        chain.mine_empty_block(20);
        let bytes = chain.save_state().unwrap();
        let mut restored = Chain::load_state(&bytes).unwrap();
        assert_eq!(restored.height(), chain.height());
        assert_eq!(restored.state().token().get_balance(&p("ST1PHIL")), 1000);
        assert!(restored.state().dao().is_constructed());

        let block = restored.mine_block(vec![Tx::Construct {
            bootstrap: p("ST1DEPLOYER.edp000-bootstrap"),
            sender: p("ST1DEPLOYER"),
        }]);
        assert_eq!(block.receipts[0].err_code(), Some(1000));
    }

    #[test]
    fn garbage_state_is_an_error() {
        assert!(matches!(
            Chain::load_state(&[1, 2, 3]),
            Err(NodeError::State(_))
        ));
    }
}
