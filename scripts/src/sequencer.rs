//! Executes deployment plans against a [`DeploymentService`].
//!
//! Steps run strictly in plan order; a step's call is only issued once the
//! previous step's result is available, and the first failure aborts the
//! remainder of the plan. Nothing already broadcast is rolled back.

use ethers::{abi::Token, types::Address};
use tracing::info;

use crate::{
    deployer::DeploymentService,
    errors::ScriptError,
    plan::{DeployKind, DeploymentPlan, StepArg, StepId},
    types::{DeployedInstance, PlatformContract, UpgradeKind},
};

/// Runs `plan` against `service`, returning the deployed instances in step
/// order.
///
/// The plan is validated before the first network call. Addresses produced
/// by earlier steps are substituted wherever later steps reference them.
pub async fn run_plan<S: DeploymentService>(
    plan: &DeploymentPlan,
    service: &S,
) -> Result<Vec<DeployedInstance>, ScriptError> {
    plan.validate()?;

    let mut outputs: Vec<DeployedInstance> = Vec::with_capacity(plan.steps().len());
    for (position, step) in plan.steps().iter().enumerate() {
        info!(
            "{}. deploying {} ({})",
            position + 1,
            step.contract,
            step.kind,
        );

        let args = resolve_args(&step.args, &outputs)?;
        let instance = match &step.kind {
            DeployKind::Direct => service.deploy(step.contract, args).await?,
            DeployKind::Proxy { initializer } => {
                service.deploy_proxy(step.contract, args, initializer).await?
            }
            DeployKind::Beacon => service.deploy_beacon(step.contract).await?,
            DeployKind::BeaconProxy {
                beacon,
                initializer,
            } => {
                let beacon = resolve_address(beacon, &outputs)?;
                service
                    .deploy_beacon_proxy(beacon, step.contract, args, initializer)
                    .await?
            }
        };

        info!(
            "{} deployed at {:#x} (implementation at {:#x})",
            step.contract, instance.address, instance.implementation,
        );
        outputs.push(instance);
    }

    Ok(outputs)
}

/// Upgrades the proxy or beacon at `target` to a fresh deployment of
/// `contract`.
///
/// The service's upgrade capability is invoked exactly once; atomicity of
/// the link is the service's concern.
pub async fn upgrade_instance<S: DeploymentService>(
    kind: UpgradeKind,
    target: Address,
    contract: PlatformContract,
    service: &S,
) -> Result<DeployedInstance, ScriptError> {
    info!("upgrading {:#x} to {}", target, contract);

    let instance = match kind {
        UpgradeKind::Proxy => service.upgrade_proxy(target, contract).await?,
        UpgradeKind::Beacon => service.upgrade_beacon(target, contract).await?,
    };

    info!(
        "{:#x} now points at implementation {:#x}",
        instance.address, instance.implementation,
    );

    Ok(instance)
}

/// Resolves a step's arguments into ABI tokens, substituting the outputs of
/// completed steps
fn resolve_args(
    args: &[StepArg],
    outputs: &[DeployedInstance],
) -> Result<Vec<Token>, ScriptError> {
    args.iter().map(|arg| resolve_arg(arg, outputs)).collect()
}

/// Resolves a single argument into an ABI token
fn resolve_arg(arg: &StepArg, outputs: &[DeployedInstance]) -> Result<Token, ScriptError> {
    Ok(match arg {
        StepArg::Address(address) => Token::Address(*address),
        StepArg::Uint(value) => Token::Uint(*value),
        StepArg::Str(value) => Token::String(value.clone()),
        StepArg::Output(id) => Token::Address(resolve_output(*id, outputs)?),
    })
}

/// Resolves an argument that must name an address
fn resolve_address(arg: &StepArg, outputs: &[DeployedInstance]) -> Result<Address, ScriptError> {
    match arg {
        StepArg::Address(address) => Ok(*address),
        StepArg::Output(id) => resolve_output(*id, outputs),
        _ => Err(ScriptError::PlanValidation(
            "beacon reference must resolve to an address".to_string(),
        )),
    }
}

/// The address produced by the completed step `id`
fn resolve_output(id: StepId, outputs: &[DeployedInstance]) -> Result<Address, ScriptError> {
    outputs
        .get(id.0)
        .map(|instance| instance.address)
        .ok_or_else(|| {
            ScriptError::PlanValidation(format!("the output of step {} is not yet available", id.0))
        })
}
