//! Simulator configuration with TOML file support.

use serde::{Deserialize, Serialize};

use edao_token::TokenMetadata;
use edao_types::{GovernanceParams, Principal, SaleParams};
use edao_utils::LogFormat;

use crate::proposal::{Allocation, ProposalContract};
use crate::state::Contracts;
use crate::NodeError;

/// Configuration of an EDAO deployment.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Account that deploys every contract and may construct the DAO.
    #[serde(default = "default_deployer")]
    pub deployer: Principal,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub governance: GovernanceParams,

    #[serde(default)]
    pub sale: SaleParams,

    #[serde(default)]
    pub token: TokenMetadata,

    #[serde(default)]
    pub genesis: GenesisConfig,
}

/// The bootstrap proposal deployed with the DAO.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Contract name of the bootstrap proposal.
    #[serde(default = "default_bootstrap_name")]
    pub bootstrap: String,

    /// Balances minted when the bootstrap proposal runs.
    #[serde(default = "default_allocations")]
    pub allocations: Vec<GenesisAllocation>,
}

/// A genesis balance. TOML integers are 64-bit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAllocation {
    pub recipient: Principal,
    pub amount: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_deployer() -> Principal {
    Principal::new("ST1DEPLOYER")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bootstrap_name() -> String {
    "edp000-bootstrap".to_string()
}

fn default_allocations() -> Vec<GenesisAllocation> {
    ["ST1PHIL", "ST1DAISY", "ST1BOBBY", "ST1HUNTER"]
        .into_iter()
        .map(|who| GenesisAllocation {
            recipient: Principal::new(who),
            amount: 1000,
        })
        .collect()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if !self.deployer.is_valid() || self.deployer.is_contract() {
            return Err(NodeError::Config(format!(
                "deployer must be a standard principal, got {}",
                self.deployer
            )));
        }
        self.governance
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        if self.sale.duration == 0 {
            return Err(NodeError::Config("sale duration must be positive".into()));
        }
        let bootstrap = Principal::contract(&self.deployer, &self.genesis.bootstrap);
        if !bootstrap.is_valid() {
            return Err(NodeError::Config(format!(
                "invalid bootstrap contract name {}",
                self.genesis.bootstrap
            )));
        }
        if let Some(bad) = self
            .genesis
            .allocations
            .iter()
            .find(|a| !a.recipient.is_valid())
        {
            return Err(NodeError::Config(format!(
                "invalid genesis recipient {}",
                bad.recipient
            )));
        }
        Ok(())
    }

    /// Principal of the bootstrap proposal.
    pub fn bootstrap_principal(&self) -> Principal {
        Principal::contract(&self.deployer, &self.genesis.bootstrap)
    }

    /// The bootstrap proposal: enable the core extensions, then mint the
    /// genesis allocations.
    pub fn bootstrap_proposal(&self) -> ProposalContract {
        let contracts = Contracts::for_deployer(&self.deployer);
        let allocations: Vec<Allocation> = self
            .genesis
            .allocations
            .iter()
            .map(|a| Allocation {
                amount: u128::from(a.amount),
                recipient: a.recipient.clone(),
            })
            .collect();
        ProposalContract::bootstrap(
            self.bootstrap_principal(),
            &contracts.bootstrap_extensions(),
            allocations,
        )
    }
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            bootstrap: default_bootstrap_name(),
            allocations: default_allocations(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            deployer: default_deployer(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            governance: GovernanceParams::default(),
            sale: SaleParams::default(),
            token: TokenMetadata::default(),
            genesis: GenesisConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProposalAction;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.deployer, Principal::new("ST1DEPLOYER"));
        assert_eq!(config.governance.proposal_duration, 1440);
        assert_eq!(config.governance.rescind_time_lock, 289);
        assert_eq!(config.sale.duration, 1440);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.genesis.bootstrap, "edp000-bootstrap");
        assert_eq!(config.genesis.allocations.len(), 4);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            log_format = "json"

            [governance]
            proposal_duration = 100
            quorum = 500

            [sale]
            minimum_sale_amount = 2000

            [genesis]
            allocations = [{ recipient = "ST1WARD", amount = 5 }]
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.governance.proposal_duration, 100);
        assert_eq!(config.governance.quorum, 500);
        assert_eq!(config.governance.minimum_proposal_start_delay, 144); // default
        assert_eq!(config.sale.minimum_sale_amount, 2000);
        assert_eq!(config.genesis.bootstrap, "edp000-bootstrap"); // default
        assert_eq!(config.genesis.allocations.len(), 1);
    }

    #[test]
    fn invalid_threshold_is_a_config_error() {
        let toml = r#"
            [governance]
            pass_threshold_bps = 20000
        "#;
        let err = NodeConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn contract_deployer_is_rejected() {
        let err = NodeConfig::from_toml_str(r#"deployer = "ST1A.contract""#).unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/edao.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "deployer = \"ST1OTHER\"").unwrap();
        let config = NodeConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.deployer, Principal::new("ST1OTHER"));
        assert_eq!(
            config.bootstrap_principal(),
            Principal::new("ST1OTHER.edp000-bootstrap")
        );
    }

    #[test]
    fn bootstrap_enables_core_extensions_then_mints() {
        let config = NodeConfig::default();
        let bootstrap = config.bootstrap_proposal();
        assert_eq!(bootstrap.principal, config.bootstrap_principal());
        assert_eq!(bootstrap.actions.len(), 4);
        assert!(matches!(
            &bootstrap.actions[0],
            ProposalAction::SetExtension { extension, enabled: true }
                if extension.as_str() == "ST1DEPLOYER.edao-token"
        ));
        match &bootstrap.actions[3] {
            ProposalAction::MintMany { allocations } => {
                assert_eq!(allocations.len(), 4);
                assert!(allocations.iter().all(|a| a.amount == 1000));
            }
            other => panic!("expected mint-many, got {other:?}"),
        }
    }
}
