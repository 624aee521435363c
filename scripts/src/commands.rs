//! Implementations of the various deploy and upgrade commands

use std::{str::FromStr, sync::Arc};

use ethers::{providers::Middleware, types::Address};

use crate::{
    cli::{DeployBeaconProxyArgs, DeployContractArgs, UpgradeBeaconArgs, UpgradeProxyArgs},
    config::{CollectionConfig, DeployConfig},
    constants::{BEACON_PROXY_KEY, SEMI_FUNGIBLE_BEACON_KEY},
    deployer::ChainDeployer,
    errors::ScriptError,
    plan::{collection_initializer_args, platform_deployment_plan, DeployStep, DeploymentPlan, StepArg},
    sequencer::{run_plan, upgrade_instance},
    types::{PlatformContract, UpgradeKind},
    utils::{
        get_contract_key, implementation_key, parse_addr_from_deployments_file,
        write_deployed_address, write_deployed_instance,
    },
};

/// Deploys the full platform plan and records every produced address
pub(crate) async fn deploy_platform(
    client: Arc<impl Middleware>,
    config: &DeployConfig,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    config.platform.validate()?;

    let deployer = ChainDeployer::new(client, &config.artifacts.dir)?;
    let plan = platform_deployment_plan(&config.platform);
    let instances = run_plan(&plan, &deployer).await?;

    for (step, instance) in plan.steps().iter().zip(instances.iter()) {
        write_deployed_instance(deployments_path, get_contract_key(step.contract), instance)?;
    }

    Ok(())
}

/// Deploys a single implementation contract directly
pub(crate) async fn deploy_contract(
    args: DeployContractArgs,
    client: Arc<impl Middleware>,
    config: &DeployConfig,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let deployer = ChainDeployer::new(client, &config.artifacts.dir)?;

    let mut plan = DeploymentPlan::new();
    plan.push(DeployStep::direct(args.contract, Vec::new()));
    let instances = run_plan(&plan, &deployer).await?;

    write_deployed_address(
        deployments_path,
        &implementation_key(get_contract_key(args.contract)),
        instances[0].address,
    )
}

/// Deploys a user collection proxy backed by an existing beacon
pub(crate) async fn deploy_beacon_proxy(
    args: DeployBeaconProxyArgs,
    client: Arc<impl Middleware>,
    config: &DeployConfig,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    config.platform.validate()?;

    let beacon = resolve_target(
        args.beacon.as_deref(),
        SEMI_FUNGIBLE_BEACON_KEY,
        deployments_path,
    )?;
    let deployer = ChainDeployer::new(client, &config.artifacts.dir)?;

    let collection = CollectionConfig {
        name: args.name,
        symbol: args.symbol,
    };
    let mut plan = DeploymentPlan::new();
    plan.push(DeployStep::beacon_proxy(
        PlatformContract::SemiFungibleCollection,
        StepArg::Address(beacon),
        collection_initializer_args(&collection, &config.platform),
    ));
    let instances = run_plan(&plan, &deployer).await?;

    write_deployed_address(deployments_path, BEACON_PROXY_KEY, instances[0].address)
}

/// Upgrades an existing proxy to a freshly deployed implementation
pub(crate) async fn upgrade_proxy(
    args: UpgradeProxyArgs,
    client: Arc<impl Middleware>,
    config: &DeployConfig,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let proxy = resolve_target(
        args.proxy.as_deref(),
        get_contract_key(args.implementation),
        deployments_path,
    )?;
    let deployer = ChainDeployer::new(client, &config.artifacts.dir)?;

    let instance =
        upgrade_instance(UpgradeKind::Proxy, proxy, args.implementation, &deployer).await?;

    write_deployed_instance(
        deployments_path,
        get_contract_key(args.implementation),
        &instance,
    )
}

/// Upgrades an existing beacon to a freshly deployed implementation
pub(crate) async fn upgrade_beacon(
    args: UpgradeBeaconArgs,
    client: Arc<impl Middleware>,
    config: &DeployConfig,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let beacon = resolve_target(
        args.beacon.as_deref(),
        get_contract_key(args.implementation),
        deployments_path,
    )?;
    let deployer = ChainDeployer::new(client, &config.artifacts.dir)?;

    let instance =
        upgrade_instance(UpgradeKind::Beacon, beacon, args.implementation, &deployer).await?;

    write_deployed_instance(
        deployments_path,
        get_contract_key(args.implementation),
        &instance,
    )
}

/// Resolves a command's target address: the explicit CLI argument when
/// given, otherwise the address recorded under `contract_key` in the
/// deployments file
fn resolve_target(
    explicit: Option<&str>,
    contract_key: &str,
    deployments_path: &str,
) -> Result<Address, ScriptError> {
    match explicit {
        Some(address) => {
            Address::from_str(address).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
        }
        None => parse_addr_from_deployments_file(deployments_path, contract_key),
    }
}
