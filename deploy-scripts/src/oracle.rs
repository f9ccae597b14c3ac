//! A handle on the oracle, reached through its proxy

use std::str::FromStr;

use alloy::{
    primitives::{Address, Bytes, B256},
    sol_types::SolCall,
};

use crate::{
    chain::ChainClient,
    constants::{PROXY_ADMIN_STORAGE_SLOT, PROXY_IMPLEMENTATION_STORAGE_SLOT},
    errors::ScriptError,
    solidity::IOracle::getPublisherRegistryAddressCall,
    utils::address_from_slot,
};

/// The oracle's call interface bound to the proxy address.
///
/// Calls are dispatched to the proxy, which forwards them to the current
/// implementation, so reads reflect the proxy's storage.
pub struct OracleHandle<'a, C> {
    /// The proxy address
    address: Address,
    /// The client calls are made through
    client: &'a C,
}

impl<'a, C: ChainClient> OracleHandle<'a, C> {
    /// Attach the oracle interface to the proxy at `address`
    pub fn attach(address: Address, client: &'a C) -> Self {
        Self { address, client }
    }

    /// The proxy address
    pub fn address(&self) -> Address {
        self.address
    }

    /// The publisher registry the oracle was initialized with
    pub async fn publisher_registry(&self) -> Result<Address, ScriptError> {
        let calldata = Bytes::from(getPublisherRegistryAddressCall {}.abi_encode());
        let ret = self.client.call(self.address, calldata).await?;

        getPublisherRegistryAddressCall::abi_decode_returns(&ret)
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    /// The proxy admin, read from the proxy's EIP-1967 admin slot
    pub async fn proxy_admin(&self) -> Result<Address, ScriptError> {
        self.read_address_slot(PROXY_ADMIN_STORAGE_SLOT).await
    }

    /// The implementation, read from the proxy's EIP-1967 implementation slot
    pub async fn implementation(&self) -> Result<Address, ScriptError> {
        self.read_address_slot(PROXY_IMPLEMENTATION_STORAGE_SLOT).await
    }

    /// Read an address out of one of the proxy's storage slots
    async fn read_address_slot(&self, slot: &str) -> Result<Address, ScriptError> {
        // Can `unwrap` here since the slot constants are valid 32-byte hex
        let slot = B256::from_str(slot).unwrap();
        let word = self.client.storage_at(self.address, slot).await?;

        Ok(address_from_slot(word))
    }
}
