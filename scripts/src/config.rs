//! Deployment configuration, consumed once at process start.
//!
//! The configuration file replaces the old workflow of editing placeholder
//! constants in the script sources before running them: network settings and
//! platform parameters live in a TOML file, secrets come from the
//! environment.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use ethers::types::Address;
use serde::Deserialize;

use crate::{
    constants::{DEFAULT_ARTIFACTS_DIR, EXPLORER_API_KEY_ENV_VAR, MAX_FEE_BPS, PRIVATE_KEY_ENV_VAR},
    errors::ScriptError,
};

/// The full deployment configuration, parsed from a TOML file
#[derive(Clone, Debug, Deserialize)]
pub struct DeployConfig {
    /// The target network
    pub network: NetworkConfig,
    /// Compiler settings the artifacts were produced with
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Where compilation artifacts are stored
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Platform parameters passed to contract initializers
    pub platform: PlatformConfig,
}

impl DeployConfig {
    /// Reads and parses the configuration file, expanding `${VAR}`
    /// environment references in the RPC URL
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ScriptError::ReadFile(format!("{}: {}", path.display(), e))
        })?;
        let mut config: DeployConfig =
            toml::from_str(&raw).map_err(|e| ScriptError::ConfigParsing(e.to_string()))?;

        config.network.rpc_url = expand_env(&config.network.rpc_url)?;

        Ok(config)
    }
}

/// The network the scripts deploy to
#[derive(Clone, Debug, Deserialize)]
pub struct NetworkConfig {
    /// The chain ID the RPC node is expected to report
    pub chain_id: u64,
    /// The RPC endpoint URL. May reference environment variables as `${VAR}`.
    pub rpc_url: String,
}

/// The compiler settings the contract artifacts were produced with.
///
/// Not consumed by the deployment logic itself; echoed at startup so the
/// operator can check they are deploying the build they expect.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// The solc version
    pub solc_version: String,
    /// The number of optimizer runs
    pub optimizer_runs: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc_version: "0.8.18".to_string(),
            optimizer_runs: 200,
        }
    }
}

/// Location of the compilation artifacts
#[derive(Clone, Debug, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding one `<ContractName>.json` artifact per contract
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
        }
    }
}

/// Platform-wide parameters threaded into contract initializers
#[derive(Clone, Debug, Deserialize)]
pub struct PlatformConfig {
    /// The ERC20 token collections are paid in
    pub payment_token: Address,
    /// The platform fee in basis points (100 = 1%)
    pub platform_fee_bps: u64,
    /// Receiver of the platform fee collected by the factory
    pub platform_fee_receiver: Address,
    /// Receiver of primary sale fees for the platform collections
    pub primary_fee_receiver: Address,
    /// Receiver of secondary sale (royalty) fees for the platform collections
    pub secondary_fee_receiver: Address,
    /// The platform's semi-fungible collection
    pub semi_fungible: CollectionConfig,
    /// The platform's non-fungible collection
    pub non_fungible: CollectionConfig,
}

impl PlatformConfig {
    /// Rejects placeholder values before any network call is issued.
    ///
    /// A zero address marks a field the operator has not filled in yet.
    pub fn validate(&self) -> Result<(), ScriptError> {
        require_address_set("platform.payment_token", self.payment_token)?;
        require_address_set("platform.platform_fee_receiver", self.platform_fee_receiver)?;
        require_address_set("platform.primary_fee_receiver", self.primary_fee_receiver)?;
        require_address_set("platform.secondary_fee_receiver", self.secondary_fee_receiver)?;

        if self.platform_fee_bps > MAX_FEE_BPS {
            return Err(ScriptError::InvalidConfiguration(format!(
                "platform.platform_fee_bps must be at most {}, got {}",
                MAX_FEE_BPS, self.platform_fee_bps,
            )));
        }

        self.semi_fungible.validate("platform.semi_fungible")?;
        self.non_fungible.validate("platform.non_fungible")
    }
}

/// Name and symbol of a collection
#[derive(Clone, Debug, Deserialize)]
pub struct CollectionConfig {
    /// The collection name
    pub name: String,
    /// The collection symbol
    pub symbol: String,
}

impl CollectionConfig {
    /// Rejects empty names and symbols
    fn validate(&self, section: &str) -> Result<(), ScriptError> {
        if self.name.is_empty() || self.symbol.is_empty() {
            return Err(ScriptError::InvalidConfiguration(format!(
                "{}.name and {}.symbol must be set",
                section, section,
            )));
        }

        Ok(())
    }
}

/// Secrets read from the environment at configuration time
pub struct Secrets {
    /// The deployer's private key, in hex
    pub private_key: String,
    /// The block explorer API key, if configured.
    ///
    /// Carried for operator tooling; the deployment logic does not use it.
    pub explorer_api_key: Option<String>,
}

impl Secrets {
    /// Reads secrets from the environment
    pub fn from_env() -> Result<Self, ScriptError> {
        let private_key = env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ScriptError::InvalidConfiguration(format!("{} is not set", PRIVATE_KEY_ENV_VAR))
        })?;
        let explorer_api_key = env::var(EXPLORER_API_KEY_ENV_VAR).ok();

        Ok(Self {
            private_key,
            explorer_api_key,
        })
    }
}

/// Returns an error naming `field` if `address` is the zero placeholder
fn require_address_set(field: &str, address: Address) -> Result<(), ScriptError> {
    if address.is_zero() {
        return Err(ScriptError::InvalidConfiguration(format!(
            "{} must be set to a non-zero address",
            field,
        )));
    }

    Ok(())
}

/// Expands `${VAR}` references in `value` from the environment
fn expand_env(value: &str) -> Result<String, ScriptError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            ScriptError::ConfigParsing("unterminated ${...} reference in RPC URL".to_string())
        })?;

        let var = &after[..end];
        let value = env::var(var).map_err(|_| {
            ScriptError::InvalidConfiguration(format!(
                "environment variable {} referenced by the RPC URL is not set",
                var,
            ))
        })?;
        expanded.push_str(&value);

        rest = &after[end + 1..];
    }
    expanded.push_str(rest);

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use std::env;

    use ethers::types::Address;

    use crate::errors::ScriptError;

    use super::{expand_env, CollectionConfig, DeployConfig, PlatformConfig};

    /// A complete configuration file with all placeholders filled in
    const EXAMPLE_CONFIG: &str = r#"
        [network]
        chain_id = 137
        rpc_url = "https://polygon-rpc.com"

        [compiler]
        solc_version = "0.8.18"
        optimizer_runs = 200

        [artifacts]
        dir = "out"

        [platform]
        payment_token = "0x00000000000000000000000000000000000000a1"
        platform_fee_bps = 100
        platform_fee_receiver = "0x00000000000000000000000000000000000000a2"
        primary_fee_receiver = "0x00000000000000000000000000000000000000a3"
        secondary_fee_receiver = "0x00000000000000000000000000000000000000a4"

        [platform.semi_fungible]
        name = "PlatformFNFT"
        symbol = "PFNFT"

        [platform.non_fungible]
        name = "PlatformNFT"
        symbol = "PNFT"
    "#;

    /// A valid platform section for validation tests
    fn platform_config() -> PlatformConfig {
        PlatformConfig {
            payment_token: Address::from_low_u64_be(1),
            platform_fee_bps: 100,
            platform_fee_receiver: Address::from_low_u64_be(2),
            primary_fee_receiver: Address::from_low_u64_be(3),
            secondary_fee_receiver: Address::from_low_u64_be(4),
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
    fn test_parse_config() {
        let config: DeployConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();

        assert_eq!(config.network.chain_id, 137);
        assert_eq!(config.compiler.optimizer_runs, 200);
        assert_eq!(config.artifacts.dir.to_str().unwrap(), "out");
        assert_eq!(
            config.platform.payment_token,
            Address::from_low_u64_be(0xa1)
        );
        assert_eq!(config.platform.semi_fungible.symbol, "PFNFT");

        config.platform.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_placeholder_address() {
        let mut platform = platform_config();
        platform.payment_token = Address::zero();

        let err = platform.validate().unwrap_err();
        assert!(matches!(err, ScriptError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_validate_rejects_excessive_fee() {
        let mut platform = platform_config();
        platform.platform_fee_bps = 10_001;

        let err = platform.validate().unwrap_err();
        assert!(matches!(err, ScriptError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_expand_env_substitutes_variables() {
        env::set_var("DEPLOY_SCRIPTS_TEST_API_KEY", "abc123");

        let expanded =
            expand_env("https://polygon-mainnet.g.alchemy.com/v2/${DEPLOY_SCRIPTS_TEST_API_KEY}")
                .unwrap();
        assert_eq!(expanded, "https://polygon-mainnet.g.alchemy.com/v2/abc123");
    }

    #[test]
    fn test_expand_env_rejects_unset_variable() {
        env::remove_var("DEPLOY_SCRIPTS_TEST_UNSET_KEY");

        let err = expand_env("https://rpc/${DEPLOY_SCRIPTS_TEST_UNSET_KEY}").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidConfiguration(_)));
    }
}
