//! EDAO simulator: replays scenario files against a fresh DAO deployment.

mod scenario;

use anyhow::Context;
use clap::Parser;
use edao_node::{Chain, NodeConfig};
use edao_utils::LogFormat;
use serde::Serialize;
use std::path::PathBuf;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "edao-sim", about = "EDAO governance chain simulator")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "EDAO_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "EDAO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "EDAO_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario file and print every receipt as a JSON line.
    Run {
        /// Scenario file (JSON).
        scenario: PathBuf,

        /// Write the final chain state here.
        #[arg(long)]
        save_state: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

/// One printed receipt.
#[derive(Serialize)]
struct ReceiptLine<'a> {
    height: u64,
    index: usize,
    #[serde(flatten)]
    receipt: &'a edao_node::Receipt,
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            NodeConfig::from_toml_file(&path)
                .with_context(|| format!("loading config from {path}"))?
        }
        None => NodeConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    edao_utils::init_tracing(&config.log_level, config.log_format)?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run {
            scenario,
            save_state,
        } => {
            let json = std::fs::read_to_string(&scenario)
                .with_context(|| format!("reading scenario {}", scenario.display()))?;
            let scenario = Scenario::from_json(&json).context("parsing scenario")?;
            let mut chain = Chain::new(&config)?;
            tracing::info!(deployer = %config.deployer, "replaying scenario");

            let mut out = Vec::new();
            scenario.run(&mut chain, |block| {
                for (index, receipt) in block.receipts.iter().enumerate() {
                    let line = ReceiptLine {
                        height: block.height.as_u64(),
                        index,
                        receipt,
                    };
                    out.push(serde_json::to_string(&line));
                }
            })?;
            for line in out {
                println!("{}", line?);
            }

            tracing::info!(height = %chain.height(), stats = %chain.stats(), "scenario finished");
            if let Some(path) = save_state {
                std::fs::write(&path, chain.save_state()?)
                    .with_context(|| format!("writing state to {}", path.display()))?;
                tracing::info!("state saved to {}", path.display());
            }
        }
    }

    Ok(())
}
