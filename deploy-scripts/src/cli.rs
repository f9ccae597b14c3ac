//! Definitions of CLI arguments and commands for deploy scripts

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Args, Parser, Subcommand};

use crate::{
    artifacts::OracleArtifacts,
    chain::ChainClient,
    commands::{deploy_oracle, upgrade, DeployOptions},
    config::OracleConfig,
    constants::{
        CONFIRMATION_POLL_INTERVAL, MAX_CONFIRMATION_POLLS, NUM_DEPLOY_CONFIRMATIONS,
        ORACLE_PROXY_CONTRACT_KEY, PROXY_ADMIN_CONTRACT_KEY,
    },
    deployments::read_deployed_address,
    errors::ScriptError,
    utils::{parse_address, parse_calldata},
};

/// Deploy and manage the upgradeable price oracle contracts
#[derive(Parser)]
pub struct Cli {
    /// Path to the networks file
    #[arg(long, env = "ORACLE_NETWORKS", default_value = "networks.toml")]
    pub networks: PathBuf,

    /// Name of the network in the networks file to run against
    #[arg(short, long, env = "ORACLE_NETWORK")]
    pub network: String,

    /// Network RPC URL, replaces the one in the networks file
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// Private key of the deployer, replaces the network's accounts
    #[arg(short, long, env = "PKEY", hide_env_values = true)]
    pub priv_key: Option<String>,

    /// Path to the deployments file, `deployments.<network>.json` by default
    #[arg(short, long)]
    pub deployments_path: Option<PathBuf>,

    /// Milliseconds between chain head polls while awaiting confirmations
    #[arg(long, default_value_t = CONFIRMATION_POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,

    /// Chain head polls before giving up on confirmations
    #[arg(long, default_value_t = MAX_CONFIRMATION_POLLS)]
    pub max_polls: usize,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The deployments file to use for the selected network
    pub fn deployments_path(&self) -> PathBuf {
        self.deployments_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("deployments.{}.json", self.network)))
    }

    /// The interval between chain head polls while awaiting confirmations
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// The available scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy and initialize the oracle system
    DeployOracle(DeployOracleArgs),
    /// Upgrade the oracle implementation behind the proxy
    Upgrade(UpgradeArgs),
}

impl Command {
    /// Run the script against the given chain
    pub async fn run(
        self,
        client: &impl ChainClient,
        allow_unlimited_contract_size: bool,
        deployments_path: &Path,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployOracle(args) => {
                // Artifacts and parameters are loaded before anything touches the chain
                let artifacts = OracleArtifacts::load(&args.artifacts)?;
                let oracle_config = OracleConfig::load(args.oracle_config.as_deref())?;
                let options = DeployOptions {
                    confirmations: args.confirmations,
                    allow_unlimited_contract_size,
                    deployments_path: Some(deployments_path.to_path_buf()),
                    verify: args.verify,
                };

                let deployed = deploy_oracle(client, &artifacts, &oracle_config, &options).await?;

                println!("Deployed from address: {:#x}", deployed.owner);
                for (role, address) in deployed.addresses() {
                    println!("{role} address: {address:#x}");
                }
                println!("Deployments written to {}", deployments_path.display());
                Ok(())
            }
            Command::Upgrade(args) => {
                let proxy_admin = match args.proxy_admin {
                    Some(addr) => parse_address(&addr)?,
                    None => read_deployed_address(deployments_path, PROXY_ADMIN_CONTRACT_KEY)?,
                };
                let proxy = match args.proxy {
                    Some(addr) => parse_address(&addr)?,
                    None => read_deployed_address(deployments_path, ORACLE_PROXY_CONTRACT_KEY)?,
                };
                let implementation = parse_address(&args.implementation)?;
                let calldata = args.calldata.as_deref().map(parse_calldata).transpose()?;

                upgrade(client, proxy_admin, proxy, implementation, calldata).await?;
                Ok(())
            }
        }
    }
}

/// Deploy the oracle system: a `ProxyAdmin`, a `PublisherRegistry`, the
/// `Oracle` implementation, and a [`TransparentUpgradeableProxy`](https://docs.openzeppelin.com/contracts/4.x/api/proxy#TransparentUpgradeableProxy)
/// initialized through its constructor.
///
/// Calls made to the proxy are forwarded to the oracle implementation.
/// Upgrade calls can only be made to the proxy through the `ProxyAdmin`.
#[derive(Args)]
pub struct DeployOracleArgs {
    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// TOML file listing the currencies and pairs to initialize the oracle with
    #[arg(short, long)]
    pub oracle_config: Option<PathBuf>,

    /// Confirmations of the implementation deployment to wait for before deploying the proxy
    #[arg(short, long, default_value_t = NUM_DEPLOY_CONFIRMATIONS)]
    pub confirmations: u64,

    /// Read the proxy's state back after deployment and check it
    #[arg(long)]
    pub verify: bool,
}

/// Upgrade the oracle implementation behind the proxy
#[derive(Args)]
pub struct UpgradeArgs {
    /// Address of the proxy admin contract, read from the deployments file if omitted
    #[arg(long)]
    pub proxy_admin: Option<String>,

    /// Address of the proxy contract, read from the deployments file if omitted
    #[arg(long)]
    pub proxy: Option<String>,

    /// Address of the new implementation contract
    #[arg(short, long)]
    pub implementation: String,

    /// Optional calldata, in hex form, with which to
    /// call the implementation contract when upgrading
    #[arg(short, long)]
    pub calldata: Option<String>,
}
