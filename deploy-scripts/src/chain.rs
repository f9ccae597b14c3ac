//! The chain-execution service the scripts run against
//!
//! [`ChainClient`] is the seam between the deployment sequence and the node:
//! everything the scripts do on chain goes through it. [`RpcChainClient`] is
//! the implementation backed by an alloy HTTP provider.

use std::time::Duration;

use alloy::{
    eips::BlockNumberOrTag,
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, B256, U256},
    providers::{DynProvider, PendingTransactionError, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    transports::{RpcError, TransportError},
};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    config::ResolvedNetwork,
    constants::{CONFIRMATION_POLL_INTERVAL, MAX_CONFIRMATION_POLLS},
    errors::ScriptError,
    types::{ChainSnapshot, ContractRole, DeploymentReceipt},
};

/// The operations the scripts need from a chain
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch the head block number and its timestamp
    async fn chain_snapshot(&self) -> Result<ChainSnapshot, ScriptError>;

    /// The addresses able to sign transactions, the first one is the default sender
    fn signers(&self) -> Vec<Address>;

    /// Deploy a contract and wait for its creation receipt
    async fn deploy(
        &self,
        role: ContractRole,
        bytecode: &Bytes,
        constructor_args: Bytes,
    ) -> Result<DeploymentReceipt, ScriptError>;

    /// Wait until a deployment has the given number of confirmations and its
    /// code is observable on chain
    async fn await_confirmations(
        &self,
        receipt: &DeploymentReceipt,
        confirmations: u64,
    ) -> Result<(), ScriptError>;

    /// Read a storage slot of a contract
    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError>;

    /// Execute a read-only call against a contract
    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError>;

    /// Send a transaction to a contract and wait for it to succeed
    async fn send(&self, to: Address, calldata: Bytes) -> Result<TxHash, ScriptError>;
}

/// Map an RPC error onto the script error taxonomy.
///
/// Error responses from the node are rejections, or reverts when the node
/// says so; everything else is a transport failure.
pub fn classify_rpc_error(context: &str, err: TransportError) -> ScriptError {
    match err {
        RpcError::ErrorResp(payload) => {
            let msg = format!("{context}: {} (code {})", payload.message, payload.code);
            if payload.message.contains("revert") {
                ScriptError::ContractReverted(msg)
            } else {
                ScriptError::TransactionRejected(msg)
            }
        }
        err => ScriptError::Transport(format!("{context}: {err}")),
    }
}

/// Map an error raised while watching a pending transaction
fn classify_pending_error(context: &str, err: PendingTransactionError) -> ScriptError {
    match err {
        PendingTransactionError::TransportError(err) => classify_rpc_error(context, err),
        err => ScriptError::Transport(format!("{context}: {err}")),
    }
}

/// A chain client backed by an alloy HTTP provider
pub struct RpcChainClient {
    /// The provider, with the deployer's wallet attached
    provider: DynProvider<Ethereum>,
    /// The addresses of the wallet's signers, in order
    signers: Vec<Address>,
    /// The interval between head polls while awaiting confirmations
    poll_interval: Duration,
    /// The maximum number of head polls while awaiting confirmations
    max_polls: usize,
}

impl RpcChainClient {
    /// Build a client for the given network, signing with all of its signers.
    ///
    /// The chain ID is filled in from the node on first use.
    pub fn new(network: &ResolvedNetwork) -> Result<Self, ScriptError> {
        let (first, rest) = network.signers.split_first().ok_or_else(|| {
            ScriptError::ClientInitialization(format!("network `{}` has no signers", network.name))
        })?;

        let mut wallet = EthereumWallet::from(first.clone());
        for signer in rest {
            wallet.register_signer(signer.clone());
        }

        let provider =
            ProviderBuilder::new().wallet(wallet).connect_http(network.url.clone());
        let signers = network.signers.iter().map(|s| s.address()).collect();

        Ok(Self::from_provider(DynProvider::new(provider), signers))
    }

    /// Wrap an existing provider, whose wallet signs for `signers`
    pub fn from_provider(provider: DynProvider<Ethereum>, signers: Vec<Address>) -> Self {
        Self {
            provider,
            signers,
            poll_interval: CONFIRMATION_POLL_INTERVAL,
            max_polls: MAX_CONFIRMATION_POLLS,
        }
    }

    /// Override how confirmations are polled
    pub fn with_polling(mut self, poll_interval: Duration, max_polls: usize) -> Self {
        self.poll_interval = poll_interval;
        self.max_polls = max_polls;
        self
    }

    /// Send a transaction and wait for a successful receipt
    async fn send_and_confirm(
        &self,
        context: &str,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, ScriptError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify_rpc_error(context, e))?;

        let tx_hash = *pending.tx_hash();
        debug!("{context}: submitted {tx_hash:#x}");

        let receipt =
            pending.get_receipt().await.map_err(|e| classify_pending_error(context, e))?;
        check_receipt_status(context, receipt)
    }
}

/// Fail on a receipt whose transaction reverted
fn check_receipt_status(
    context: &str,
    receipt: TransactionReceipt,
) -> Result<TransactionReceipt, ScriptError> {
    if !receipt.status() {
        return Err(ScriptError::ContractReverted(format!(
            "{context}: transaction {:#x} reverted",
            receipt.transaction_hash
        )));
    }

    Ok(receipt)
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn chain_snapshot(&self) -> Result<ChainSnapshot, ScriptError> {
        let block_number = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| classify_rpc_error("fetching block number", e))?;

        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await
            .map_err(|e| classify_rpc_error("fetching head block", e))?
            .ok_or_else(|| ScriptError::Transport(format!("block {block_number} not found")))?;

        Ok(ChainSnapshot { block_number, timestamp: block.header.timestamp })
    }

    fn signers(&self) -> Vec<Address> {
        self.signers.clone()
    }

    async fn deploy(
        &self,
        role: ContractRole,
        bytecode: &Bytes,
        constructor_args: Bytes,
    ) -> Result<DeploymentReceipt, ScriptError> {
        let mut init_code = bytecode.to_vec();
        init_code.extend_from_slice(&constructor_args);
        let tx = TransactionRequest::default().with_deploy_code(init_code);

        let context = format!("deploying {role}");
        let receipt = self.send_and_confirm(&context, tx).await?;
        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!("{context}: receipt has no contract address"))
        })?;

        Ok(DeploymentReceipt {
            role,
            address,
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }

    async fn await_confirmations(
        &self,
        receipt: &DeploymentReceipt,
        confirmations: u64,
    ) -> Result<(), ScriptError> {
        let mined_at = receipt.block_number.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "{} receipt does not report a block number",
                receipt.role
            ))
        })?;
        // The inclusion block is the first confirmation
        let target = mined_at + confirmations.saturating_sub(1);

        for _ in 0..self.max_polls {
            let head = self
                .provider
                .get_block_number()
                .await
                .map_err(|e| classify_rpc_error("polling block number", e))?;

            if head >= target {
                let code = self
                    .provider
                    .get_code_at(receipt.address)
                    .await
                    .map_err(|e| classify_rpc_error("fetching deployed code", e))?;
                if code.is_empty() {
                    return Err(ScriptError::ContractDeployment(format!(
                        "no code at {} address {:#x}",
                        receipt.role, receipt.address
                    )));
                }

                return Ok(());
            }

            debug!("{} at block {mined_at}, head at {head}, waiting for {target}", receipt.role);
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(ScriptError::Transport(format!(
            "timed out waiting for {confirmations} confirmations of {} deployment {:#x}",
            receipt.role, receipt.tx_hash
        )))
    }

    async fn storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError> {
        let value = self
            .provider
            .get_storage_at(address, U256::from_be_bytes(slot.0))
            .await
            .map_err(|e| classify_rpc_error("reading storage", e))?;

        Ok(B256::from(value))
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<Bytes, ScriptError> {
        let tx = TransactionRequest::default().with_to(to).with_input(calldata);
        self.provider.call(tx).await.map_err(|e| classify_rpc_error("calling contract", e))
    }

    async fn send(&self, to: Address, calldata: Bytes) -> Result<TxHash, ScriptError> {
        let tx = TransactionRequest::default().with_to(to).with_input(calldata);
        let context = format!("sending transaction to {to:#x}");
        let receipt = self.send_and_confirm(&context, tx).await?;

        Ok(receipt.transaction_hash)
    }
}
