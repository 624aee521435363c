//! The deployment capability the sequencer drives, and its production
//! implementation over an RPC client.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use async_trait::async_trait;
use ethers::{
    abi::Token,
    contract::ContractFactory,
    providers::Middleware,
    types::{Address, Bytes, H256},
};

use crate::{
    constants::{
        BEACON_PROXY_ARTIFACT, IMPLEMENTATION_STORAGE_SLOT, NUM_BYTES_ADDRESS,
        NUM_BYTES_STORAGE_SLOT, NUM_DEPLOY_CONFIRMATIONS, PROXY_ADMIN_STORAGE_SLOT,
        TRANSPARENT_PROXY_ARTIFACT, UPGRADEABLE_BEACON_ARTIFACT,
    },
    errors::ScriptError,
    solidity::{ProxyAdminContract, UpgradeableBeaconContract},
    types::{DeployedInstance, PlatformContract},
    utils::load_artifact,
};

/// The external deployment capability.
///
/// The sequencer treats every method as an opaque, possibly slow, possibly
/// failing remote call. Tests substitute a stub; production code uses
/// [`ChainDeployer`].
#[async_trait]
pub trait DeploymentService {
    /// Deploys `contract` directly, passing `args` to its constructor
    async fn deploy(
        &self,
        contract: PlatformContract,
        args: Vec<Token>,
    ) -> Result<DeployedInstance, ScriptError>;

    /// Deploys `contract` behind a transparent proxy, calling `initializer`
    /// with `args` in the proxy's deployment transaction
    async fn deploy_proxy(
        &self,
        contract: PlatformContract,
        args: Vec<Token>,
        initializer: &str,
    ) -> Result<DeployedInstance, ScriptError>;

    /// Deploys `contract` and an upgradeable beacon pointing at it
    async fn deploy_beacon(
        &self,
        contract: PlatformContract,
    ) -> Result<DeployedInstance, ScriptError>;

    /// Deploys a proxy backed by the existing `beacon`, calling `contract`'s
    /// `initializer` with `args` in the deployment transaction
    async fn deploy_beacon_proxy(
        &self,
        beacon: Address,
        contract: PlatformContract,
        args: Vec<Token>,
        initializer: &str,
    ) -> Result<DeployedInstance, ScriptError>;

    /// Deploys a fresh `contract` implementation and points the proxy at it.
    ///
    /// The link either completes or fails atomically on the node's side.
    async fn upgrade_proxy(
        &self,
        proxy: Address,
        contract: PlatformContract,
    ) -> Result<DeployedInstance, ScriptError>;

    /// Deploys a fresh `contract` implementation and points the beacon at it
    async fn upgrade_beacon(
        &self,
        beacon: Address,
        contract: PlatformContract,
    ) -> Result<DeployedInstance, ScriptError>;
}

/// A [`DeploymentService`] issuing real transactions through an RPC client.
///
/// Contract ABIs and creation bytecode are loaded from compilation
/// artifacts; proxies and beacons use the OpenZeppelin contracts the
/// artifacts directory is expected to contain.
pub struct ChainDeployer<M> {
    /// The RPC client transactions are sent through
    client: Arc<M>,
    /// The directory compilation artifacts are loaded from
    artifacts_dir: PathBuf,
    /// The deployer address, used as the owner of proxy admins and beacons
    owner: Address,
}

impl<M: Middleware> ChainDeployer<M> {
    /// Creates a deployer over `client`, loading artifacts from
    /// `artifacts_dir`
    pub fn new(client: Arc<M>, artifacts_dir: &Path) -> Result<Self, ScriptError> {
        let owner = client.default_sender().ok_or_else(|| {
            ScriptError::ClientInitialization(
                "client does not have a sender attached".to_string(),
            )
        })?;

        Ok(Self {
            client,
            artifacts_dir: artifacts_dir.to_path_buf(),
            owner,
        })
    }

    /// Deploys the contract in the named artifact, passing `args` to its
    /// constructor, and returns the deployed address
    async fn deploy_from_artifact(
        &self,
        name: &str,
        args: Vec<Token>,
    ) -> Result<Address, ScriptError> {
        let artifact = load_artifact(&self.artifacts_dir, name)?;
        let factory = ContractFactory::new(artifact.abi, artifact.bytecode, self.client.clone());

        let contract = factory
            .deploy_tokens(args)
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .confirmations(NUM_DEPLOY_CONFIRMATIONS)
            .send()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        Ok(contract.address())
    }

    /// Encodes a call to the named artifact's `initializer` method with
    /// `args`
    fn initializer_calldata(
        &self,
        name: &str,
        initializer: &str,
        args: &[Token],
    ) -> Result<Bytes, ScriptError> {
        let artifact = load_artifact(&self.artifacts_dir, name)?;
        let function = artifact
            .abi
            .function(initializer)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;

        let data = function
            .encode_input(args)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;

        Ok(Bytes::from(data))
    }

    /// Reads the address stored in `slot` of `contract`
    async fn storage_address(
        &self,
        contract: Address,
        slot: &str,
    ) -> Result<Address, ScriptError> {
        let value = self
            .client
            .get_storage_at(
                contract,
                // Can `unwrap` here since we know the storage slot constitutes a valid H256
                H256::from_str(slot).unwrap(),
                None, /* block */
            )
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(Address::from_slice(
            &value[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..NUM_BYTES_STORAGE_SLOT],
        ))
    }
}

#[async_trait]
impl<M: Middleware> DeploymentService for ChainDeployer<M> {
    async fn deploy(
        &self,
        contract: PlatformContract,
        args: Vec<Token>,
    ) -> Result<DeployedInstance, ScriptError> {
        let address = self.deploy_from_artifact(contract.artifact_name(), args).await?;

        Ok(DeployedInstance {
            address,
            implementation: address,
        })
    }

    async fn deploy_proxy(
        &self,
        contract: PlatformContract,
        args: Vec<Token>,
        initializer: &str,
    ) -> Result<DeployedInstance, ScriptError> {
        let implementation = self
            .deploy_from_artifact(contract.artifact_name(), Vec::new())
            .await?;
        let calldata = self.initializer_calldata(contract.artifact_name(), initializer, &args)?;

        let proxy = self
            .deploy_from_artifact(
                TRANSPARENT_PROXY_ARTIFACT,
                vec![
                    Token::Address(implementation),
                    Token::Address(self.owner),
                    Token::Bytes(calldata.to_vec()),
                ],
            )
            .await?;

        // Report the implementation the proxy actually points at
        let implementation = self
            .storage_address(proxy, IMPLEMENTATION_STORAGE_SLOT)
            .await?;

        Ok(DeployedInstance {
            address: proxy,
            implementation,
        })
    }

    async fn deploy_beacon(
        &self,
        contract: PlatformContract,
    ) -> Result<DeployedInstance, ScriptError> {
        let implementation = self
            .deploy_from_artifact(contract.artifact_name(), Vec::new())
            .await?;

        let beacon = self
            .deploy_from_artifact(
                UPGRADEABLE_BEACON_ARTIFACT,
                vec![Token::Address(implementation), Token::Address(self.owner)],
            )
            .await?;

        Ok(DeployedInstance {
            address: beacon,
            implementation,
        })
    }

    async fn deploy_beacon_proxy(
        &self,
        beacon: Address,
        contract: PlatformContract,
        args: Vec<Token>,
        initializer: &str,
    ) -> Result<DeployedInstance, ScriptError> {
        let calldata = self.initializer_calldata(contract.artifact_name(), initializer, &args)?;

        let proxy = self
            .deploy_from_artifact(
                BEACON_PROXY_ARTIFACT,
                vec![Token::Address(beacon), Token::Bytes(calldata.to_vec())],
            )
            .await?;

        let implementation = UpgradeableBeaconContract::new(beacon, self.client.clone())
            .implementation()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(DeployedInstance {
            address: proxy,
            implementation,
        })
    }

    async fn upgrade_proxy(
        &self,
        proxy: Address,
        contract: PlatformContract,
    ) -> Result<DeployedInstance, ScriptError> {
        let implementation = self
            .deploy_from_artifact(contract.artifact_name(), Vec::new())
            .await?;

        // Upgrade calls must go through the proxy admin recorded in the
        // EIP1967 admin slot
        let admin_address = self.storage_address(proxy, PROXY_ADMIN_STORAGE_SLOT).await?;
        let admin = ProxyAdminContract::new(admin_address, self.client.clone());

        let receipt = admin
            .upgrade_and_call(proxy, implementation, Bytes::new())
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if receipt.is_none() {
            return Err(ScriptError::ContractInteraction(
                "upgrade transaction was dropped from the mempool".to_string(),
            ));
        }

        Ok(DeployedInstance {
            address: proxy,
            implementation,
        })
    }

    async fn upgrade_beacon(
        &self,
        beacon: Address,
        contract: PlatformContract,
    ) -> Result<DeployedInstance, ScriptError> {
        let implementation = self
            .deploy_from_artifact(contract.artifact_name(), Vec::new())
            .await?;

        let receipt = UpgradeableBeaconContract::new(beacon, self.client.clone())
            .upgrade_to(implementation)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if receipt.is_none() {
            return Err(ScriptError::ContractInteraction(
                "upgrade transaction was dropped from the mempool".to_string(),
            ));
        }

        Ok(DeployedInstance {
            address: beacon,
            implementation,
        })
    }
}
