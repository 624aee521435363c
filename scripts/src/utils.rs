//! Utilities for the deploy scripts.

use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use ethers::{
    abi::{Abi, Address},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::Bytes,
};
use json::JsonValue;
use serde::Deserialize;

use crate::{
    constants::{
        ARTIFACT_EXTENSION, COLLECTION_FACTORY_KEY, DEPLOYMENTS_KEY, IMPLEMENTATION_KEY_SUFFIX,
        PLATFORM_NON_FUNGIBLE_KEY, PLATFORM_SEMI_FUNGIBLE_KEY, SEMI_FUNGIBLE_BEACON_KEY,
    },
    errors::ScriptError,
    types::{DeployedInstance, PlatformContract},
};

/// Sets up the client with which to send transactions, checking that the
/// node reports the chain ID the configuration expects
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
    chain_id: u64,
) -> Result<Arc<impl Middleware>, ScriptError> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let wallet = LocalWallet::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let node_chain_id = provider
        .get_chainid()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?
        .as_u64();
    if node_chain_id != chain_id {
        return Err(ScriptError::ClientInitialization(format!(
            "node reports chain id {}, configuration expects {}",
            node_chain_id, chain_id,
        )));
    }

    let client = Arc::new(SignerMiddleware::new(
        provider,
        wallet.with_chain_id(node_chain_id),
    ));

    Ok(client)
}

/// A parsed compilation artifact in the Hardhat layout
#[derive(Deserialize)]
pub struct ContractArtifact {
    /// The contract's ABI
    pub abi: Abi,
    /// The contract's creation bytecode
    pub bytecode: Bytes,
}

/// Loads the named contract's artifact from `dir`
pub fn load_artifact(dir: &Path, name: &str) -> Result<ContractArtifact, ScriptError> {
    let path = dir.join(name).with_extension(ARTIFACT_EXTENSION);
    let raw = fs::read_to_string(&path)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&raw).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}

/// Parses the file at `file_path` as JSON
pub fn get_json_from_file(file_path: &str) -> Result<JsonValue, ScriptError> {
    let mut file_contents = String::new();
    File::open(file_path)
        .map_err(|e| ScriptError::ReadFile(e.to_string()))?
        .read_to_string(&mut file_contents)
        .map_err(|e| ScriptError::ReadFile(e.to_string()))?;

    json::parse(&file_contents).map_err(|e| ScriptError::ReadFile(e.to_string()))
}

/// Reads the address recorded under `contract_key` in the deployments file
pub fn parse_addr_from_deployments_file(
    file_path: &str,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let parsed_json = get_json_from_file(file_path)?;

    Address::from_str(
        parsed_json[DEPLOYMENTS_KEY][contract_key]
            .as_str()
            .ok_or_else(|| {
                ScriptError::ReadFile(format!(
                    "could not parse {} address from deployments file",
                    contract_key,
                ))
            })?,
    )
    .map_err(|e| ScriptError::ReadFile(e.to_string()))
}

/// Records `address` under `contract_key` in the deployments file
pub fn write_deployed_address(
    file_path: &str,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    // If the file doesn't exist, create it
    if !PathBuf::from(file_path).exists() {
        fs::write(file_path, "{}").map_err(|e| ScriptError::WriteFile(e.to_string()))?;
    }
    let mut parsed_json = get_json_from_file(file_path)?;

    parsed_json[DEPLOYMENTS_KEY][contract_key] = JsonValue::String(format!("{address:#x}"));

    fs::write(file_path, json::stringify_pretty(parsed_json, 4))
        .map_err(|e| ScriptError::WriteFile(e.to_string()))?;

    Ok(())
}

/// Records a deployed instance's address and its implementation address in
/// the deployments file
pub fn write_deployed_instance(
    file_path: &str,
    contract_key: &str,
    instance: &DeployedInstance,
) -> Result<(), ScriptError> {
    write_deployed_address(file_path, contract_key, instance.address)?;
    write_deployed_address(
        file_path,
        &implementation_key(contract_key),
        instance.implementation,
    )
}

/// The deployments-file key under which a contract's implementation address
/// is recorded
pub fn implementation_key(contract_key: &str) -> String {
    format!("{contract_key}{IMPLEMENTATION_KEY_SUFFIX}")
}

/// Maps a contract to the key its address is recorded under in the
/// deployments file. V2 implementations share their V1 contract's key.
pub fn get_contract_key(contract: PlatformContract) -> &'static str {
    match contract {
        PlatformContract::SemiFungibleCollection | PlatformContract::SemiFungibleCollectionV2 => {
            SEMI_FUNGIBLE_BEACON_KEY
        }
        PlatformContract::CollectionFactory | PlatformContract::CollectionFactoryV2 => {
            COLLECTION_FACTORY_KEY
        }
        PlatformContract::PlatformSemiFungibleCollection
        | PlatformContract::PlatformSemiFungibleCollectionV2 => PLATFORM_SEMI_FUNGIBLE_KEY,
        PlatformContract::PlatformNonFungibleCollection
        | PlatformContract::PlatformNonFungibleCollectionV2 => PLATFORM_NON_FUNGIBLE_KEY,
    }
}

#[cfg(test)]
mod tests {
    use ethers::abi::Address;

    use crate::{
        constants::COLLECTION_FACTORY_KEY, errors::ScriptError, types::DeployedInstance,
    };

    use super::{
        implementation_key, parse_addr_from_deployments_file, write_deployed_address,
        write_deployed_instance,
    };

    #[test]
    fn test_deployments_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let path = path.to_str().unwrap();

        let address = Address::from_low_u64_be(0xdead);
        write_deployed_address(path, COLLECTION_FACTORY_KEY, address).unwrap();

        let parsed = parse_addr_from_deployments_file(path, COLLECTION_FACTORY_KEY).unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let path = path.to_str().unwrap();

        write_deployed_address(path, "some_contract", Address::from_low_u64_be(1)).unwrap();

        let err = parse_addr_from_deployments_file(path, "other_contract").unwrap_err();
        assert!(matches!(err, ScriptError::ReadFile(_)));
    }

    #[test]
    fn test_instance_records_both_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let path = path.to_str().unwrap();

        let instance = DeployedInstance {
            address: Address::from_low_u64_be(0x100),
            implementation: Address::from_low_u64_be(0x200),
        };
        write_deployed_instance(path, COLLECTION_FACTORY_KEY, &instance).unwrap();

        assert_eq!(
            parse_addr_from_deployments_file(path, COLLECTION_FACTORY_KEY).unwrap(),
            instance.address,
        );
        assert_eq!(
            parse_addr_from_deployments_file(path, &implementation_key(COLLECTION_FACTORY_KEY))
                .unwrap(),
            instance.implementation,
        );
    }
}
