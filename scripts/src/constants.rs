//! Constants used in the deploy scripts

/// The storage slot containing the implementation address in an ERC1967 proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const IMPLEMENTATION_STORAGE_SLOT: &str =
    "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: &str =
    "0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103";

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The number of confirmations to wait for on each deployment transaction
pub const NUM_DEPLOY_CONFIRMATIONS: usize = 1;

/// The name of the initializer method invoked on freshly deployed proxies
pub const INITIALIZER_METHOD: &str = "initialize";

/// The artifact name of the OpenZeppelin TransparentUpgradeableProxy contract
pub const TRANSPARENT_PROXY_ARTIFACT: &str = "TransparentUpgradeableProxy";

/// The artifact name of the OpenZeppelin UpgradeableBeacon contract
pub const UPGRADEABLE_BEACON_ARTIFACT: &str = "UpgradeableBeacon";

/// The artifact name of the OpenZeppelin BeaconProxy contract
pub const BEACON_PROXY_ARTIFACT: &str = "BeaconProxy";

/// The file extension of a compilation artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The default directory containing compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default path of the deployment configuration file
pub const DEFAULT_CONFIG_PATH: &str = "deploy.toml";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The user collection beacon key in the `deployments.json` file
pub const SEMI_FUNGIBLE_BEACON_KEY: &str = "semi_fungible_collection_beacon";

/// The collection factory proxy key in the `deployments.json` file
pub const COLLECTION_FACTORY_KEY: &str = "collection_factory_proxy";

/// The platform semi-fungible collection proxy key in the `deployments.json` file
pub const PLATFORM_SEMI_FUNGIBLE_KEY: &str = "platform_semi_fungible_proxy";

/// The platform non-fungible collection proxy key in the `deployments.json` file
pub const PLATFORM_NON_FUNGIBLE_KEY: &str = "platform_non_fungible_proxy";

/// The key in the `deployments.json` file under which the most recently
/// deployed standalone beacon proxy is recorded
pub const BEACON_PROXY_KEY: &str = "semi_fungible_collection_proxy";

/// The suffix appended to a contract key to form its implementation key
/// in the `deployments.json` file
pub const IMPLEMENTATION_KEY_SUFFIX: &str = "_implementation";

/// The name of the environment variable holding the deployer's private key
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// The name of the environment variable holding the block explorer API key
pub const EXPLORER_API_KEY_ENV_VAR: &str = "EXPLORER_API_KEY";

/// The maximum platform fee, in basis points
pub const MAX_FEE_BPS: u64 = 10_000;
