//! Definitions of Solidity types and functions called during deployment

use alloy::sol;

sol! {
    /// The oracle implementation interface, as reached through the proxy
    #[allow(missing_docs)]
    interface IOracle {
        struct Currency {
            bytes32 id;
            uint256 decimals;
            bool isAbstractCurrency;
            address ethereumAddress;
        }

        struct Pair {
            bytes32 id;
            bytes32 quoteCurrencyId;
            bytes32 baseCurrencyId;
        }

        function initialize(address _publisherRegistryAddress, Currency[] memory _currencies, Pair[] memory _pairs) external;

        function getPublisherRegistryAddress() external view returns (address);
    }
}

sol! {
    /// The transparent upgradeable proxy, constructed with its implementation,
    /// its admin, and the calldata it delegate-calls into the implementation
    #[allow(missing_docs)]
    contract TransparentUpgradeableProxy {
        constructor(address _logic, address admin_, bytes memory _data);
    }
}

sol! {
    /// The proxy admin interface
    #[allow(missing_docs)]
    interface IProxyAdmin {
        function upgrade(address proxy, address implementation) external;

        function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
    }
}
