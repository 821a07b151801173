use std::path::PathBuf;

use clap::Parser;

use crate::network::EPHEMERAL_NETWORK;

/// Deploy the token contract to a development network and export its
/// address and artifact for the frontend.
#[derive(Parser, Debug, Clone)]
#[command(name = "deploy-token", version, about)]
pub struct DeployConfig {
    /// Network to deploy to. `sandbox` is recreated on every run.
    #[arg(long, env = "TOKEN_NETWORK", default_value = EPHEMERAL_NETWORK)]
    pub network: String,

    /// Where persistent networks keep their ledger state.
    #[arg(long, env = "TOKEN_NETWORKS_DIR", default_value = ".networks")]
    pub networks_dir: PathBuf,

    /// Build output holding the compiled contract wasm.
    #[arg(
        long,
        env = "TOKEN_ARTIFACTS_DIR",
        default_value = "target/wasm32-unknown-unknown/release"
    )]
    pub artifacts_dir: PathBuf,

    /// Directory the frontend reads contract files from.
    #[arg(long, env = "TOKEN_FRONTEND_DIR", default_value = "frontend/src/contracts")]
    pub frontend_dir: PathBuf,

    /// Contract to deploy.
    #[arg(long, default_value = "Token")]
    pub contract: String,

    #[arg(short, long)]
    pub verbose: bool,
}

impl DeployConfig {
    pub fn is_ephemeral(&self) -> bool {
        self.network == EPHEMERAL_NETWORK
    }
}
