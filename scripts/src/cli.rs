//! Definitions of CLI arguments and commands for the deploy scripts

use std::{path::PathBuf, sync::Arc};

use clap::{Args, Parser, Subcommand};
use ethers::providers::Middleware;

use crate::{
    commands::{
        deploy_beacon_proxy, deploy_contract, deploy_platform, upgrade_beacon, upgrade_proxy,
    },
    config::DeployConfig,
    constants::{DEFAULT_CONFIG_PATH, DEFAULT_DEPLOYMENTS_PATH},
    errors::ScriptError,
    types::PlatformContract,
};

/// CLI for deploying and upgrading the platform contracts
#[derive(Parser)]
pub struct Cli {
    /// Path to the deployment configuration file
    #[arg(short, long, env = "DEPLOY_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Path to the file at which to write deployed addresses
    #[arg(short, long, env = "DEPLOYMENTS_FILE", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy and upgrade operations exposed by the scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the full platform: the user collection beacon, the collection
    /// factory proxy, and the platform's own collection proxies
    DeployPlatform,
    /// Deploy a single contract implementation directly, with no proxy in
    /// front of it
    DeployContract(DeployContractArgs),
    /// Deploy a collection proxy backed by an existing beacon
    DeployBeaconProxy(DeployBeaconProxyArgs),
    /// Deploy a new implementation and upgrade an existing proxy to it
    UpgradeProxy(UpgradeProxyArgs),
    /// Deploy a new implementation and upgrade an existing beacon to it
    UpgradeBeacon(UpgradeBeaconArgs),
}

impl Command {
    /// Dispatches the parsed command
    pub async fn run(
        self,
        client: Arc<impl Middleware>,
        config: &DeployConfig,
        deployments_path: &str,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployPlatform => deploy_platform(client, config, deployments_path).await,
            Command::DeployContract(args) => {
                deploy_contract(args, client, config, deployments_path).await
            }
            Command::DeployBeaconProxy(args) => {
                deploy_beacon_proxy(args, client, config, deployments_path).await
            }
            Command::UpgradeProxy(args) => {
                upgrade_proxy(args, client, config, deployments_path).await
            }
            Command::UpgradeBeacon(args) => {
                upgrade_beacon(args, client, config, deployments_path).await
            }
        }
    }
}

/// Deploy a single contract implementation
#[derive(Args)]
pub struct DeployContractArgs {
    /// The contract to deploy
    #[arg(short, long)]
    pub contract: PlatformContract,
}

/// Deploy a collection proxy backed by an existing beacon
#[derive(Args)]
pub struct DeployBeaconProxyArgs {
    /// Address of the backing beacon in hex; read from the deployments file
    /// when omitted
    #[arg(short, long)]
    pub beacon: Option<String>,

    /// The collection name passed to the initializer
    #[arg(long)]
    pub name: String,

    /// The collection symbol passed to the initializer
    #[arg(long)]
    pub symbol: String,
}

/// Upgrade an existing proxy to a new implementation.
///
/// The upgrade goes through the proxy admin deployed alongside the proxy;
/// only the admin may relink a
/// [`TransparentUpgradeableProxy`](https://docs.openzeppelin.com/contracts/5.x/api/proxy#transparent_proxy).
#[derive(Args)]
pub struct UpgradeProxyArgs {
    /// Address of the proxy contract in hex (not the implementation); read
    /// from the deployments file when omitted
    #[arg(short, long)]
    pub proxy: Option<String>,

    /// The implementation contract to upgrade to
    #[arg(short, long)]
    pub implementation: PlatformContract,
}

/// Upgrade an existing beacon to a new implementation, moving every proxy
/// backed by the beacon at once
#[derive(Args)]
pub struct UpgradeBeaconArgs {
    /// Address of the beacon contract in hex; read from the deployments file
    /// when omitted
    #[arg(short, long)]
    pub beacon: Option<String>,

    /// The implementation contract to upgrade to
    #[arg(short, long)]
    pub implementation: PlatformContract,
}
