//! Scenario files: an ordered list of steps replayed against a chain.

use edao_node::{Block, Chain, ProposalContract, Tx};
use edao_types::BlockHeight;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Scenario {
    /// Proposal contracts deployed before the first step.
    #[serde(default)]
    pub proposals: Vec<ProposalContract>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Mine one block with these transactions.
    Block(Vec<Tx>),
    /// Mine this many empty blocks.
    Advance(u64),
    /// Mine empty blocks until the next block runs at this height.
    AdvanceTo(BlockHeight),
    /// Deploy a proposal contract.
    Deploy(ProposalContract),
}

impl Scenario {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Replay every step, handing each mined block to `on_block`.
    pub fn run(self, chain: &mut Chain, mut on_block: impl FnMut(&Block)) -> anyhow::Result<()> {
        for proposal in self.proposals {
            chain.deploy_proposal(proposal)?;
        }
        for step in self.steps {
            match step {
                Step::Block(txs) => on_block(&chain.mine_block(txs)),
                Step::Advance(n) => chain.mine_empty_block(n),
                Step::AdvanceTo(height) => chain.mine_empty_block_until(height),
                Step::Deploy(proposal) => {
                    chain.deploy_proposal(proposal)?;
                }
            }
        }
        Ok(())
    }
}
