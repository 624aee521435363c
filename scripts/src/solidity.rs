//! Definitions of Solidity functions called during deployment

use ethers::contract::abigen;

abigen!(
    ProxyAdminContract,
    r#"[
        function upgradeAndCall(address proxy, address implementation, bytes memory data) external;
    ]"#,
);

abigen!(
    UpgradeableBeaconContract,
    r#"[
        function implementation() external view returns (address)
        function upgradeTo(address newImplementation) external
    ]"#
);
