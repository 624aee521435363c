//! Entrypoint for the contract deployment and upgrade scripts

use clap::Parser;
use scripts::{
    cli::Cli,
    config::{DeployConfig, Secrets},
    errors::ScriptError,
    utils::setup_client,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        config,
        deployments_path,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let config = DeployConfig::load(&config)?;
    let secrets = Secrets::from_env()?;
    info!(
        "loaded configuration for chain {} (artifacts compiled with solc {}, {} optimizer runs)",
        config.network.chain_id, config.compiler.solc_version, config.compiler.optimizer_runs,
    );

    let client = setup_client(
        &secrets.private_key,
        &config.network.rpc_url,
        config.network.chain_id,
    )
    .await?;

    command.run(client, &config, &deployments_path).await
}
