//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::primitives::{Address, TxHash};

use crate::constants::{
    ORACLE_CONTRACT_KEY, ORACLE_CONTRACT_NAME, ORACLE_PROXY_CONTRACT_KEY, PROXY_ADMIN_CONTRACT_KEY,
    PROXY_ADMIN_CONTRACT_NAME, PROXY_CONTRACT_NAME, PUBLISHER_REGISTRY_CONTRACT_KEY,
    PUBLISHER_REGISTRY_CONTRACT_NAME,
};

/// The chain head observed at the start of a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSnapshot {
    /// The head block number
    pub block_number: u64,
    /// The timestamp of the head block
    pub timestamp: u64,
}

/// The role each contract plays in the oracle system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractRole {
    /// The admin allowed to upgrade the proxy
    ProxyAdmin,
    /// The registry of authorized publishers
    PublisherRegistry,
    /// The oracle implementation contract
    Oracle,
    /// The upgradeable proxy fronting the oracle
    OracleProxy,
}

impl ContractRole {
    /// All roles, in deployment order
    pub const ALL: [ContractRole; 4] = [
        ContractRole::ProxyAdmin,
        ContractRole::PublisherRegistry,
        ContractRole::Oracle,
        ContractRole::OracleProxy,
    ];

    /// The name of the compilation artifact for the role
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractRole::ProxyAdmin => PROXY_ADMIN_CONTRACT_NAME,
            ContractRole::PublisherRegistry => PUBLISHER_REGISTRY_CONTRACT_NAME,
            ContractRole::Oracle => ORACLE_CONTRACT_NAME,
            ContractRole::OracleProxy => PROXY_CONTRACT_NAME,
        }
    }

    /// The key under which the role's address is recorded in the deployments file
    pub fn deployments_key(&self) -> &'static str {
        match self {
            ContractRole::ProxyAdmin => PROXY_ADMIN_CONTRACT_KEY,
            ContractRole::PublisherRegistry => PUBLISHER_REGISTRY_CONTRACT_KEY,
            ContractRole::Oracle => ORACLE_CONTRACT_KEY,
            ContractRole::OracleProxy => ORACLE_PROXY_CONTRACT_KEY,
        }
    }
}

impl Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractRole::ProxyAdmin => write!(f, "ProxyAdmin"),
            ContractRole::PublisherRegistry => write!(f, "PublisherRegistry"),
            ContractRole::Oracle => write!(f, "Oracle"),
            ContractRole::OracleProxy => write!(f, "Proxy"),
        }
    }
}

/// The outcome of a contract-creation transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentReceipt {
    /// The role of the deployed contract
    pub role: ContractRole,
    /// The address of the deployed contract
    pub address: Address,
    /// The hash of the creation transaction
    pub tx_hash: TxHash,
    /// The block the creation transaction was included in, if reported
    pub block_number: Option<u64>,
}

/// The addresses of a fully deployed and initialized oracle system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedOracle {
    /// The chain head at the start of the deployment
    pub snapshot: ChainSnapshot,
    /// The account that submitted the deployments
    pub owner: Address,
    /// The proxy admin contract
    pub proxy_admin: Address,
    /// The publisher registry contract
    pub publisher_registry: Address,
    /// The oracle implementation contract
    pub implementation: Address,
    /// The proxy through which the oracle is used
    pub proxy: Address,
}

impl DeployedOracle {
    /// The deployed addresses, in deployment order
    pub fn addresses(&self) -> [(ContractRole, Address); 4] {
        [
            (ContractRole::ProxyAdmin, self.proxy_admin),
            (ContractRole::PublisherRegistry, self.publisher_registry),
            (ContractRole::Oracle, self.implementation),
            (ContractRole::OracleProxy, self.proxy),
        ]
    }
}
