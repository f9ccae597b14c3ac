//! Implementations of the deploy scripts

use std::path::PathBuf;

use alloy::{
    primitives::{Address, Bytes, TxHash},
    sol_types::{SolCall, SolConstructor},
};
use tracing::{info, warn};

use crate::{
    artifacts::OracleArtifacts,
    chain::ChainClient,
    config::OracleConfig,
    constants::NUM_DEPLOY_CONFIRMATIONS,
    deployments::write_deployed_address,
    errors::ScriptError,
    oracle::OracleHandle,
    solidity::{
        IOracle::{initializeCall, Currency, Pair},
        IProxyAdmin::{upgradeAndCallCall, upgradeCall},
        TransparentUpgradeableProxy,
    },
    types::{ContractRole, DeployedOracle, DeploymentReceipt},
};

/// Options controlling an oracle deployment
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Confirmations to wait for on the implementation before deploying the proxy
    pub confirmations: u64,
    /// Skip the EIP-170 / EIP-3860 code size checks
    pub allow_unlimited_contract_size: bool,
    /// Where to record deployed addresses, if anywhere
    pub deployments_path: Option<PathBuf>,
    /// Read the proxy's state back after deployment and compare it
    pub verify: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            confirmations: NUM_DEPLOY_CONFIRMATIONS,
            allow_unlimited_contract_size: false,
            deployments_path: None,
            verify: false,
        }
    }
}

/// Prepare calldata for the Oracle contract's `initialize` method
pub fn oracle_initialize_calldata(
    publisher_registry: Address,
    currencies: Vec<Currency>,
    pairs: Vec<Pair>,
) -> Bytes {
    initializeCall {
        _publisherRegistryAddress: publisher_registry,
        _currencies: currencies,
        _pairs: pairs,
    }
    .abi_encode()
    .into()
}

/// Prepare the constructor arguments of the upgradeable proxy
pub fn proxy_constructor_args(
    implementation: Address,
    proxy_admin: Address,
    initializer: Bytes,
) -> Bytes {
    TransparentUpgradeableProxy::constructorCall {
        _logic: implementation,
        admin_: proxy_admin,
        _data: initializer,
    }
    .abi_encode()
    .into()
}

/// Deploy and initialize the oracle system: proxy admin, publisher registry,
/// oracle implementation, and the proxy in front of it.
///
/// Each step waits for the previous one, and any failure stops the sequence.
/// Contracts deployed before a failure stay on chain, unconnected. Running
/// this twice deploys two independent systems.
pub async fn deploy_oracle<C: ChainClient>(
    client: &C,
    artifacts: &OracleArtifacts,
    oracle_config: &OracleConfig,
    options: &DeployOptions,
) -> Result<DeployedOracle, ScriptError> {
    // Everything that can be checked locally is checked before any transaction
    oracle_config.validate()?;
    let currencies = oracle_config.currency_descriptors()?;
    let pairs = oracle_config.pair_descriptors()?;
    if options.allow_unlimited_contract_size {
        warn!("contract size limits are disabled for this network");
    }

    let snapshot = client.chain_snapshot().await?;
    info!(
        "chain head at block {} (timestamp {})",
        snapshot.block_number, snapshot.timestamp
    );

    let owner = client.signers().first().copied().ok_or_else(|| {
        ScriptError::Configuration("chain client has no signing accounts".to_string())
    })?;
    info!("deploying from address {owner:#x}");

    let proxy_admin =
        deploy_contract(client, artifacts, ContractRole::ProxyAdmin, Bytes::new(), options).await?;
    let publisher_registry =
        deploy_contract(client, artifacts, ContractRole::PublisherRegistry, Bytes::new(), options)
            .await?;
    let implementation =
        deploy_contract(client, artifacts, ContractRole::Oracle, Bytes::new(), options).await?;

    let initializer = oracle_initialize_calldata(publisher_registry.address, currencies, pairs);

    // The proxy's constructor delegate-calls into the implementation, so it
    // must be observable on chain first
    info!(
        "waiting for {} confirmation(s) of the {} deployment",
        options.confirmations, implementation.role
    );
    client.await_confirmations(&implementation, options.confirmations).await?;

    let proxy_args = proxy_constructor_args(implementation.address, proxy_admin.address, initializer);
    let proxy =
        deploy_contract(client, artifacts, ContractRole::OracleProxy, proxy_args, options).await?;

    let deployed = DeployedOracle {
        snapshot,
        owner,
        proxy_admin: proxy_admin.address,
        publisher_registry: publisher_registry.address,
        implementation: implementation.address,
        proxy: proxy.address,
    };

    let oracle = OracleHandle::attach(deployed.proxy, client);
    info!("oracle reachable through proxy at {:#x}", oracle.address());
    if options.verify {
        verify_deployment(&oracle, &deployed).await?;
    }

    Ok(deployed)
}

/// Deploy a single contract of the oracle system and record its address
async fn deploy_contract<C: ChainClient>(
    client: &C,
    artifacts: &OracleArtifacts,
    role: ContractRole,
    constructor_args: Bytes,
    options: &DeployOptions,
) -> Result<DeploymentReceipt, ScriptError> {
    let artifact = artifacts.get(role);
    if !options.allow_unlimited_contract_size {
        artifact.check_code_size(constructor_args.len())?;
    }

    let receipt = client.deploy(role, &artifact.bytecode, constructor_args).await?;
    if receipt.address.is_zero() {
        return Err(ScriptError::ContractDeployment(format!(
            "{role} deployment returned the zero address"
        )));
    }
    info!("{role} deployed at {:#x} (tx {:#x})", receipt.address, receipt.tx_hash);

    if let Some(path) = &options.deployments_path {
        write_deployed_address(path, role.deployments_key(), receipt.address)?;
    }

    Ok(receipt)
}

/// Check that the proxy was wired and initialized with the deployed contracts
pub async fn verify_deployment<C: ChainClient>(
    oracle: &OracleHandle<'_, C>,
    deployed: &DeployedOracle,
) -> Result<(), ScriptError> {
    let checks = [
        ("publisher registry", oracle.publisher_registry().await?, deployed.publisher_registry),
        ("proxy admin", oracle.proxy_admin().await?, deployed.proxy_admin),
        ("implementation", oracle.implementation().await?, deployed.implementation),
    ];

    for (what, found, expected) in checks {
        if found != expected {
            return Err(ScriptError::InitializationMismatch(format!(
                "proxy reports {what} {found:#x}, expected {expected:#x}"
            )));
        }
    }

    info!("verified proxy initialization");
    Ok(())
}

/// Point the proxy at a new implementation through the proxy admin.
///
/// With calldata the new implementation is called through the proxy as part
/// of the upgrade, without it the upgrade is a plain implementation swap.
pub async fn upgrade<C: ChainClient>(
    client: &C,
    proxy_admin: Address,
    proxy: Address,
    implementation: Address,
    calldata: Option<Bytes>,
) -> Result<TxHash, ScriptError> {
    let admin_calldata: Bytes = match calldata {
        Some(data) if !data.is_empty() => upgradeAndCallCall { proxy, implementation, data }
            .abi_encode()
            .into(),
        _ => upgradeCall { proxy, implementation }.abi_encode().into(),
    };

    let tx_hash = client.send(proxy_admin, admin_calldata).await?;
    info!("upgrade submitted in tx {tx_hash:#x}");

    let current = OracleHandle::attach(proxy, client).implementation().await?;
    if current != implementation {
        return Err(ScriptError::InitializationMismatch(format!(
            "proxy implementation is {current:#x} after upgrade, expected {implementation:#x}"
        )));
    }

    info!("proxy {proxy:#x} now points at {implementation:#x}");
    Ok(tx_hash)
}
