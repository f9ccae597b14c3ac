//! Scripts for deploying and initializing the upgradeable price oracle contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod chain;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod deployments;
pub mod errors;
pub mod oracle;
pub mod solidity;
pub mod types;
pub mod utils;
