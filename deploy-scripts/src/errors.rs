//! Definitions of errors that can occur during deployment of the oracle contracts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur while deploying or upgrading the oracle contracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Invalid or missing network, account, or oracle configuration
    Configuration(String),
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error locating or parsing a compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Contract code exceeds the chain's size ceiling
    ContractSizeLimit(String),
    /// The node could not be reached or did not answer in time
    Transport(String),
    /// The node rejected a transaction
    TransactionRejected(String),
    /// Contract execution reverted
    ContractReverted(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// On-chain state after deployment does not match what was deployed
    InitializationMismatch(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Configuration(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractSizeLimit(s) => write!(f, "contract size limit exceeded: {}", s),
            ScriptError::Transport(s) => write!(f, "transport error: {}", s),
            ScriptError::TransactionRejected(s) => write!(f, "transaction rejected: {}", s),
            ScriptError::ContractReverted(s) => write!(f, "contract execution reverted: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::InitializationMismatch(s) => {
                write!(f, "deployed state does not match: {}", s)
            }
        }
    }
}

impl Error for ScriptError {}
