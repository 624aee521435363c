//! Deployment plans: ordered deploy steps with typed references to the
//! outputs of earlier steps.
//!
//! A plan makes the dependency between steps explicit. Instead of threading
//! addresses through local variables, a step names the step it depends on by
//! [`StepId`], and the ordering invariant (a step may only reference outputs
//! that precede it) is checked before anything is sent to the network.

use std::fmt::{self, Display};

use ethers::types::{Address, U256};

use crate::{
    config::{CollectionConfig, PlatformConfig},
    constants::INITIALIZER_METHOD,
    errors::ScriptError,
    types::PlatformContract,
};

/// Identifies a step within a [`DeploymentPlan`].
///
/// Returned by [`DeploymentPlan::push`]; the only way a later step can name
/// an earlier step's output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StepId(pub(crate) usize);

/// A single constructor or initializer argument of a deploy step
#[derive(Clone, Debug, PartialEq)]
pub enum StepArg {
    /// A literal address
    Address(Address),
    /// A literal unsigned integer
    Uint(U256),
    /// A literal string
    Str(String),
    /// The address produced by an earlier step of the same plan
    Output(StepId),
}

/// How a step's contract is put on chain
#[derive(Clone, Debug, PartialEq)]
pub enum DeployKind {
    /// The contract itself, with its constructor arguments
    Direct,
    /// The implementation behind a transparent proxy, initialized in the
    /// proxy's deployment transaction
    Proxy {
        /// The initializer method encoded into the proxy constructor
        initializer: String,
    },
    /// The implementation behind a new upgradeable beacon
    Beacon,
    /// A proxy forwarding to whatever implementation an existing beacon
    /// points at
    BeaconProxy {
        /// The backing beacon, as a literal address or an earlier step's
        /// output
        beacon: StepArg,
        /// The initializer method encoded into the proxy constructor
        initializer: String,
    },
}

impl Display for DeployKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployKind::Direct => write!(f, "contract"),
            DeployKind::Proxy { .. } => write!(f, "transparent proxy"),
            DeployKind::Beacon => write!(f, "beacon"),
            DeployKind::BeaconProxy { .. } => write!(f, "beacon proxy"),
        }
    }
}

/// One deployment operation within a plan
#[derive(Clone, Debug)]
pub struct DeployStep {
    /// The contract being deployed
    pub contract: PlatformContract,
    /// The deployment style
    pub kind: DeployKind,
    /// Constructor arguments for direct deployments, initializer arguments
    /// for proxied ones
    pub args: Vec<StepArg>,
}

impl DeployStep {
    /// A direct deployment of `contract`
    pub fn direct(contract: PlatformContract, args: Vec<StepArg>) -> Self {
        Self {
            contract,
            kind: DeployKind::Direct,
            args,
        }
    }

    /// A transparent proxy deployment of `contract`, initialized with `args`
    pub fn proxy(contract: PlatformContract, args: Vec<StepArg>) -> Self {
        Self {
            contract,
            kind: DeployKind::Proxy {
                initializer: INITIALIZER_METHOD.to_string(),
            },
            args,
        }
    }

    /// A beacon deployment backed by a fresh `contract` implementation
    pub fn beacon(contract: PlatformContract) -> Self {
        Self {
            contract,
            kind: DeployKind::Beacon,
            args: Vec::new(),
        }
    }

    /// A beacon proxy deployment of `contract` behind `beacon`, initialized
    /// with `args`
    pub fn beacon_proxy(contract: PlatformContract, beacon: StepArg, args: Vec<StepArg>) -> Self {
        Self {
            contract,
            kind: DeployKind::BeaconProxy {
                beacon,
                initializer: INITIALIZER_METHOD.to_string(),
            },
            args,
        }
    }
}

/// An ordered list of deploy steps, executed strictly in order
#[derive(Clone, Debug, Default)]
pub struct DeploymentPlan {
    /// The steps of the plan, in execution order
    steps: Vec<DeployStep>,
}

impl DeploymentPlan {
    /// An empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step to the plan, returning its [`StepId`]
    pub fn push(&mut self, step: DeployStep) -> StepId {
        self.steps.push(step);
        StepId(self.steps.len() - 1)
    }

    /// The steps of the plan, in execution order
    pub fn steps(&self) -> &[DeployStep] {
        &self.steps
    }

    /// Checks the plan before any network call is issued: every `Output`
    /// reference must point at a strictly earlier step, and no literal
    /// address may be the zero placeholder
    pub fn validate(&self) -> Result<(), ScriptError> {
        for (position, step) in self.steps.iter().enumerate() {
            for arg in step.args.iter() {
                check_arg(position, arg)?;
            }

            if let DeployKind::BeaconProxy { beacon, .. } = &step.kind {
                match beacon {
                    StepArg::Address(_) | StepArg::Output(_) => check_arg(position, beacon)?,
                    _ => {
                        return Err(ScriptError::PlanValidation(format!(
                            "step {} must reference its beacon by address or step output",
                            position,
                        )))
                    }
                }
            }
        }

        Ok(())
    }
}

/// Checks a single argument of the step at `position`
fn check_arg(position: usize, arg: &StepArg) -> Result<(), ScriptError> {
    match arg {
        StepArg::Output(StepId(source)) if *source >= position => {
            Err(ScriptError::PlanValidation(format!(
                "step {} references the output of step {}, which does not precede it",
                position, source,
            )))
        }
        StepArg::Address(address) if address.is_zero() => Err(ScriptError::PlanValidation(
            format!("step {} has an unset address argument", position),
        )),
        _ => Ok(()),
    }
}

/// Builds the full platform deployment plan:
///
/// 1. the beacon all user collections share,
/// 2. the collection factory proxy, pointed at that beacon,
/// 3. the platform's own semi-fungible collection proxy,
/// 4. the platform's own non-fungible collection proxy.
pub fn platform_deployment_plan(platform: &PlatformConfig) -> DeploymentPlan {
    let mut plan = DeploymentPlan::new();

    let beacon = plan.push(DeployStep::beacon(PlatformContract::SemiFungibleCollection));

    plan.push(DeployStep::proxy(
        PlatformContract::CollectionFactory,
        vec![
            StepArg::Output(beacon),
            StepArg::Uint(U256::from(platform.platform_fee_bps)),
            StepArg::Address(platform.payment_token),
            StepArg::Address(platform.platform_fee_receiver),
        ],
    ));

    plan.push(DeployStep::proxy(
        PlatformContract::PlatformSemiFungibleCollection,
        collection_initializer_args(&platform.semi_fungible, platform),
    ));

    plan.push(DeployStep::proxy(
        PlatformContract::PlatformNonFungibleCollection,
        collection_initializer_args(&platform.non_fungible, platform),
    ));

    plan
}

/// The initializer arguments shared by all collection contracts
pub fn collection_initializer_args(
    collection: &CollectionConfig,
    platform: &PlatformConfig,
) -> Vec<StepArg> {
    vec![
        StepArg::Str(collection.name.clone()),
        StepArg::Str(collection.symbol.clone()),
        StepArg::Address(platform.payment_token),
        StepArg::Address(platform.primary_fee_receiver),
        StepArg::Address(platform.secondary_fee_receiver),
    ]
}

#[cfg(test)]
mod tests {
    use ethers::types::{Address, U256};

    use crate::{
        config::{CollectionConfig, PlatformConfig},
        errors::ScriptError,
        types::PlatformContract,
    };

    use super::{
        platform_deployment_plan, DeployKind, DeployStep, DeploymentPlan, StepArg, StepId,
    };

    /// A filled-in platform section
    fn platform_config() -> PlatformConfig {
        PlatformConfig {
            payment_token: Address::from_low_u64_be(0xa1),
            platform_fee_bps: 100,
            platform_fee_receiver: Address::from_low_u64_be(0xa2),
            primary_fee_receiver: Address::from_low_u64_be(0xa3),
            secondary_fee_receiver: Address::from_low_u64_be(0xa4),
            semi_fungible: CollectionConfig {
                name: "PlatformFNFT".to_string(),
                symbol: "PFNFT".to_string(),
            },
            non_fungible: CollectionConfig {
                name: "PlatformNFT".to_string(),
                symbol: "PNFT".to_string(),
            },
        }
    }

    #[test]
    fn test_push_returns_sequential_ids() {
        let mut plan = DeploymentPlan::new();
        let first = plan.push(DeployStep::beacon(PlatformContract::SemiFungibleCollection));
        let second = plan.push(DeployStep::direct(
            PlatformContract::CollectionFactory,
            vec![StepArg::Output(first)],
        ));

        assert_eq!(first, StepId(0));
        assert_eq!(second, StepId(1));
        plan.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_forward_reference() {
        let mut plan = DeploymentPlan::new();
        plan.push(DeployStep::proxy(
            PlatformContract::CollectionFactory,
            vec![StepArg::Output(StepId(1))],
        ));
        plan.push(DeployStep::beacon(PlatformContract::SemiFungibleCollection));

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ScriptError::PlanValidation(_)));
    }

    #[test]
    fn test_validate_rejects_self_reference() {
        let mut plan = DeploymentPlan::new();
        plan.push(DeployStep::proxy(
            PlatformContract::CollectionFactory,
            vec![StepArg::Output(StepId(0))],
        ));

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ScriptError::PlanValidation(_)));
    }

    #[test]
    fn test_validate_rejects_placeholder_address() {
        let mut plan = DeploymentPlan::new();
        plan.push(DeployStep::proxy(
            PlatformContract::CollectionFactory,
            vec![StepArg::Address(Address::zero())],
        ));

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ScriptError::PlanValidation(_)));
    }

    #[test]
    fn test_validate_rejects_non_address_beacon_reference() {
        let mut plan = DeploymentPlan::new();
        plan.push(DeployStep::beacon_proxy(
            PlatformContract::SemiFungibleCollection,
            StepArg::Uint(U256::from(1)),
            vec![],
        ));

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ScriptError::PlanValidation(_)));
    }

    #[test]
    fn test_platform_plan_structure() {
        let platform = platform_config();
        let plan = platform_deployment_plan(&platform);
        plan.validate().unwrap();

        let steps = plan.steps();
        assert_eq!(steps.len(), 4);

        assert_eq!(steps[0].contract, PlatformContract::SemiFungibleCollection);
        assert!(matches!(steps[0].kind, DeployKind::Beacon));

        // The factory is initialized with the beacon's address, then the
        // fee, payment token and fee receiver
        assert_eq!(steps[1].contract, PlatformContract::CollectionFactory);
        assert_eq!(steps[1].args[0], StepArg::Output(StepId(0)));
        assert_eq!(steps[1].args[1], StepArg::Uint(U256::from(100)));
        assert_eq!(steps[1].args[2], StepArg::Address(platform.payment_token));

        assert_eq!(
            steps[2].contract,
            PlatformContract::PlatformSemiFungibleCollection
        );
        assert_eq!(steps[2].args[0], StepArg::Str("PlatformFNFT".to_string()));
        assert_eq!(
            steps[3].contract,
            PlatformContract::PlatformNonFungibleCollection
        );
        assert_eq!(steps[3].args.len(), 5);
    }
}
