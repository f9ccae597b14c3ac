//! An in-memory chain used to exercise the deploy scripts

#![allow(dead_code)]

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Mutex, MutexGuard},
};

use alloy::{
    primitives::{Address, Bytes, TxHash, B256},
    sol_types::{SolCall, SolValue},
};
use async_trait::async_trait;
use deploy_scripts::{
    artifacts::{ContractArtifact, OracleArtifacts},
    chain::ChainClient,
    constants::{MAX_CONTRACT_CODE_SIZE, PROXY_ADMIN_STORAGE_SLOT, PROXY_IMPLEMENTATION_STORAGE_SLOT},
    errors::ScriptError,
    solidity::{
        IOracle::{getPublisherRegistryAddressCall, initializeCall},
        IProxyAdmin::{upgradeAndCallCall, upgradeCall},
    },
    types::{ChainSnapshot, ContractRole, DeploymentReceipt},
};

/// The first address the mock chain hands out
pub const FIRST_ADDRESS_BYTE: u8 = 0xA1;

/// The block the mock chain starts at
pub const GENESIS_BLOCK: u64 = 100;

/// The timestamp of the mock chain's first block
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// The signer of the mock chain
pub fn deployer() -> Address {
    Address::with_last_byte(0x01)
}

/// A proxy as seen by the mock chain
#[derive(Debug, Clone)]
pub struct MockProxy {
    /// The admin passed to the constructor
    pub admin: Address,
    /// The current implementation
    pub implementation: Address,
    /// The registry the initializer stored
    pub registry: Address,
    /// The raw initializer passed to the constructor
    pub initializer: Bytes,
}

/// A recorded confirmation wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationWait {
    /// The role whose deployment was awaited
    pub role: ContractRole,
    /// The requested confirmations
    pub confirmations: u64,
    /// How many contracts had been deployed when the wait happened
    pub deployed_before: usize,
}

/// The mutable state of the mock chain
#[derive(Debug, Default)]
pub struct MockState {
    /// The next address byte to hand out
    next_address: u8,
    /// The current head
    block_number: u64,
    /// Every deployment, in order
    pub deployments: Vec<(ContractRole, Address, Bytes)>,
    /// Every confirmation wait, in order
    pub confirmation_waits: Vec<ConfirmationWait>,
    /// The deployed proxies
    pub proxies: HashMap<Address, MockProxy>,
    /// Every transaction sent to a contract, in order
    pub sent: Vec<(Address, Bytes)>,
}

/// An in-memory chain that hands out sequential addresses
pub struct MockChain {
    /// The signers of the chain
    signers: Vec<Address>,
    /// A role whose deployment fails with a transport error
    fail_on: Option<ContractRole>,
    /// The chain state
    state: Mutex<MockState>,
}

impl MockChain {
    /// A chain with one signer, handing out `0xA1`, `0xA2`, ...
    pub fn new() -> Self {
        Self {
            signers: vec![deployer()],
            fail_on: None,
            state: Mutex::new(MockState {
                next_address: FIRST_ADDRESS_BYTE,
                block_number: GENESIS_BLOCK,
                ..Default::default()
            }),
        }
    }

    /// Fail the deployment of the given role
    pub fn failing_on(mut self, role: ContractRole) -> Self {
        self.fail_on = Some(role);
        self
    }

    /// Remove all signers
    pub fn without_signers(mut self) -> Self {
        self.signers.clear();
        self
    }

    /// Lock the chain state for inspection
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// The roles deployed so far, in order
    pub fn deployed_roles(&self) -> Vec<ContractRole> {
        self.state().deployments.iter().map(|(role, ..)| *role).collect()
    }

    /// The constructor arguments the proxy was deployed with
    pub fn proxy_constructor_args(&self) -> Option<Bytes> {
        self.state()
            .deployments
            .iter()
            .find(|(role, ..)| *role == ContractRole::OracleProxy)
            .map(|(.., args)| args.clone())
    }

    /// The proxy deployed at `address`
    pub fn proxy(&self, address: Address) -> Option<MockProxy> {
        self.state().proxies.get(&address).cloned()
    }
}

/// Build a proxy from its constructor arguments, as the proxy's constructor would
fn construct_proxy(constructor_args: &[u8]) -> Result<MockProxy, ScriptError> {
    let (implementation, admin, initializer) =
        <(Address, Address, Bytes)>::abi_decode_params(constructor_args)
            .map_err(|e| ScriptError::ContractReverted(e.to_string()))?;

    // The delegate call into `initialize` reverts on a malformed payload
    let init = initializeCall::abi_decode(&initializer)
        .map_err(|e| ScriptError::ContractReverted(format!("initializer: {e}")))?;

    Ok(MockProxy {
        admin,
        implementation,
        registry: init._publisherRegistryAddress,
        initializer,
    })
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_snapshot(&self) -> Result<ChainSnapshot, ScriptError> {
        let block_number = self.state().block_number;
        Ok(ChainSnapshot {
            block_number,
            timestamp: GENESIS_TIMESTAMP + (block_number - GENESIS_BLOCK) * 12,
        })
    }

    fn signers(&self) -> Vec<Address> {
        self.signers.clone()
    }

    async fn deploy(
        &self,
        role: ContractRole,
        _bytecode: &Bytes,
        constructor_args: Bytes,
    ) -> Result<DeploymentReceipt, ScriptError> {
        if self.fail_on == Some(role) {
            return Err(ScriptError::Transport(format!("deploying {role}: connection reset")));
        }

        let proxy = match role {
            ContractRole::OracleProxy => Some(construct_proxy(&constructor_args)?),
            _ => None,
        };

        let mut state = self.state();
        let address = Address::with_last_byte(state.next_address);
        state.next_address += 1;
        state.block_number += 1;

        state.deployments.push((role, address, constructor_args));
        if let Some(proxy) = proxy {
            state.proxies.insert(address, proxy);
        }

        Ok(DeploymentReceipt {
            role,
            address,
            tx_hash: TxHash::with_last_byte(address.0[19]),
            block_number: Some(state.block_number),
        })
    }

    async fn await_confirmations(
        &self,
        receipt: &DeploymentReceipt,
        confirmations: u64,
    ) -> Result<(), ScriptError> {
        let mut state = self.state();
        let deployed_before = state.deployments.len();
        state.confirmation_waits.push(ConfirmationWait {
            role: receipt.role,
            confirmations,
            deployed_before,
        });

        Ok(())
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError> {
        let proxy = self
            .proxy(address)
            .ok_or_else(|| ScriptError::ContractReverted(format!("no proxy at {address}")))?;

        if slot == B256::from_str(PROXY_ADMIN_STORAGE_SLOT).unwrap() {
            Ok(proxy.admin.into_word())
        } else if slot == B256::from_str(PROXY_IMPLEMENTATION_STORAGE_SLOT).unwrap() {
            Ok(proxy.implementation.into_word())
        } else {
            Ok(B256::ZERO)
        }
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError> {
        let proxy = self
            .proxy(to)
            .ok_or_else(|| ScriptError::ContractReverted(format!("no code at {to}")))?;

        if calldata.starts_with(&getPublisherRegistryAddressCall::SELECTOR) {
            Ok(proxy.registry.abi_encode().into())
        } else {
            Err(ScriptError::ContractReverted("unknown selector".to_string()))
        }
    }

    async fn send(&self, to: Address, calldata: Bytes) -> Result<TxHash, ScriptError> {
        let mut state = self.state();
        state.sent.push((to, calldata.clone()));

        let (proxy, implementation) = if let Ok(call) = upgradeCall::abi_decode(&calldata) {
            (call.proxy, call.implementation)
        } else if let Ok(call) = upgradeAndCallCall::abi_decode(&calldata) {
            (call.proxy, call.implementation)
        } else {
            return Err(ScriptError::ContractReverted("unknown selector".to_string()));
        };

        let entry = state
            .proxies
            .get_mut(&proxy)
            .ok_or_else(|| ScriptError::ContractReverted(format!("no proxy at {proxy}")))?;
        if entry.admin != to {
            return Err(ScriptError::ContractReverted("caller is not the proxy admin".to_string()));
        }
        entry.implementation = implementation;

        Ok(TxHash::with_last_byte(state.sent.len() as u8))
    }
}

/// An artifact with the given runtime code size
fn artifact(name: &str, tag: u8, runtime_len: usize) -> ContractArtifact {
    ContractArtifact {
        name: name.to_string(),
        bytecode: Bytes::from(vec![0x60, tag]),
        deployed_bytecode: Bytes::from(vec![tag; runtime_len]),
    }
}

/// Small artifacts for every contract
pub fn test_artifacts() -> OracleArtifacts {
    OracleArtifacts {
        proxy_admin: artifact("ProxyAdmin", 1, 64),
        publisher_registry: artifact("PublisherRegistry", 2, 64),
        oracle: artifact("Oracle", 3, 64),
        proxy: artifact("TransparentUpgradeableProxy", 4, 64),
    }
}

/// Artifacts whose oracle implementation is over the EIP-170 ceiling
pub fn oversized_oracle_artifacts() -> OracleArtifacts {
    OracleArtifacts {
        oracle: artifact("Oracle", 3, MAX_CONTRACT_CODE_SIZE + 1),
        ..test_artifacts()
    }
}
