//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use clap::ValueEnum;
use ethers::types::Address;

/// The contracts managed by these scripts
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlatformContract {
    /// The user collection implementation placed behind the factory's beacon
    SemiFungibleCollection,
    /// The V2 user collection implementation
    SemiFungibleCollectionV2,
    /// The collection factory contract
    CollectionFactory,
    /// The V2 collection factory implementation
    CollectionFactoryV2,
    /// The platform's own semi-fungible collection contract
    PlatformSemiFungibleCollection,
    /// The V2 platform semi-fungible collection implementation
    PlatformSemiFungibleCollectionV2,
    /// The platform's own non-fungible collection contract
    PlatformNonFungibleCollection,
    /// The V2 platform non-fungible collection implementation
    PlatformNonFungibleCollectionV2,
}

impl PlatformContract {
    /// The name under which the contract's compilation artifact is stored
    pub fn artifact_name(&self) -> &'static str {
        match self {
            PlatformContract::SemiFungibleCollection => "SemiFungibleCollection",
            PlatformContract::SemiFungibleCollectionV2 => "SemiFungibleCollectionV2",
            PlatformContract::CollectionFactory => "CollectionFactory",
            PlatformContract::CollectionFactoryV2 => "CollectionFactoryV2",
            PlatformContract::PlatformSemiFungibleCollection => "PlatformSemiFungibleCollection",
            PlatformContract::PlatformSemiFungibleCollectionV2 => {
                "PlatformSemiFungibleCollectionV2"
            }
            PlatformContract::PlatformNonFungibleCollection => "PlatformNonFungibleCollection",
            PlatformContract::PlatformNonFungibleCollectionV2 => "PlatformNonFungibleCollectionV2",
        }
    }
}

impl Display for PlatformContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.artifact_name())
    }
}

/// The outcome of a successful deploy or upgrade call.
///
/// `address` is the externally visible address (the proxy or beacon, or the
/// contract itself for direct deployments); `implementation` is the logic
/// contract behind it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeployedInstance {
    /// The externally visible address of the instance
    pub address: Address,
    /// The address of the implementation contract backing the instance
    pub implementation: Address,
}

/// The kind of upgradeable construct targeted by an upgrade
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    /// A transparent proxy, upgraded through its proxy admin
    Proxy,
    /// An upgradeable beacon, upgraded through its owner
    Beacon,
}
