use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use token_deployer::{logger, run, DeployConfig};

fn main() -> ExitCode {
    let config = DeployConfig::parse();
    logger::init_cli_logger(config.verbose);

    tracing::debug!("Deploy config: {:?}", config);

    let result = run(&config).with_context(|| {
        format!(
            "failed to deploy {} to network {}",
            config.contract, config.network
        )
    });

    match result {
        Ok(deployment) => {
            tracing::info!(
                "Deployment of {} finished, frontend files in {}",
                deployment.contract_name,
                config.frontend_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}
