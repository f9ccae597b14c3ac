//! Network and oracle configuration
//!
//! Networks are read from a TOML file keyed by network name:
//!
//! ```toml
//! [networks.bsctest]
//! url = "https://data-seed-prebsc-2-s2.binance.org:8545"
//! accounts = ["${BSCTEST_DEPLOYER_KEY}"]
//! allow_unlimited_contract_size = true
//! ```
//!
//! Accounts are references to environment variables, resolved when the
//! network is selected. Private keys written directly into the file are
//! rejected.

use std::{collections::HashMap, fs, path::Path, str::FromStr};

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    constants::{SECRET_REF_PREFIX, SECRET_REF_SUFFIX},
    errors::ScriptError,
    solidity::IOracle::{Currency, Pair},
    utils::format_bytes32_string,
};

// ------------
// | Networks |
// ------------

/// The contents of a networks file
#[derive(Debug, Clone, Deserialize)]
pub struct NetworksFile {
    /// The configured networks, by name
    pub networks: HashMap<String, NetworkConfig>,
}

/// A single network entry, as written in the networks file
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// The RPC endpoint
    pub url: String,
    /// Secret references to the signing keys, in order of preference
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Whether the network accepts contracts above the EIP-170 size ceiling
    #[serde(default, alias = "allowUnlimitedContractSize")]
    pub allow_unlimited_contract_size: bool,
}

/// A network with its endpoint parsed and its signing keys resolved
#[derive(Debug)]
pub struct ResolvedNetwork {
    /// The network name
    pub name: String,
    /// The RPC endpoint
    pub url: Url,
    /// The signing keys, the first one submits the deployments
    pub signers: Vec<PrivateKeySigner>,
    /// Whether the network accepts contracts above the EIP-170 size ceiling
    pub allow_unlimited_contract_size: bool,
}

impl FromStr for NetworksFile {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| ScriptError::Configuration(e.to_string()))
    }
}

impl NetworksFile {
    /// Read a networks file from disk
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ScriptError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        contents.parse()
    }

    /// Select a network and resolve its endpoint and signing keys.
    ///
    /// `rpc_url` replaces the configured endpoint and `priv_key` replaces the
    /// configured accounts when given.
    pub fn resolve(
        &self,
        name: &str,
        rpc_url: Option<&str>,
        priv_key: Option<&str>,
    ) -> Result<ResolvedNetwork, ScriptError> {
        let network = self.networks.get(name).ok_or_else(|| {
            let known = self.networks.keys().sorted().join(", ");
            ScriptError::Configuration(format!("unknown network `{name}`, known: [{known}]"))
        })?;

        let url_str = rpc_url.unwrap_or(&network.url);
        let url = Url::parse(url_str)
            .map_err(|e| ScriptError::Configuration(format!("invalid url `{url_str}`: {e}")))?;

        let signers = match priv_key {
            Some(key) => vec![parse_signer(key)?],
            None => network
                .accounts
                .iter()
                .map(|account| resolve_secret(account).and_then(|key| parse_signer(&key)))
                .collect::<Result<Vec<_>, _>>()?,
        };
        if signers.is_empty() {
            return Err(ScriptError::Configuration(format!(
                "network `{name}` has no signing accounts"
            )));
        }

        Ok(ResolvedNetwork {
            name: name.to_string(),
            url,
            signers,
            allow_unlimited_contract_size: network.allow_unlimited_contract_size,
        })
    }
}

/// Resolve a `${VAR}` secret reference from the environment
pub fn resolve_secret(reference: &str) -> Result<String, ScriptError> {
    let var = reference
        .strip_prefix(SECRET_REF_PREFIX)
        .and_then(|s| s.strip_suffix(SECRET_REF_SUFFIX))
        .ok_or_else(|| {
            ScriptError::Configuration(
                "accounts must reference environment variables as `${VAR}`, \
                 private keys are not accepted in the networks file"
                    .to_string(),
            )
        })?;

    std::env::var(var).map_err(|_| {
        ScriptError::Configuration(format!("environment variable `{var}` is not set"))
    })
}

/// Parse a hex private key into a signer
fn parse_signer(key: &str) -> Result<PrivateKeySigner, ScriptError> {
    PrivateKeySigner::from_str(key.trim())
        .map_err(|e| ScriptError::Configuration(format!("invalid private key: {e}")))
}

// ----------
// | Oracle |
// ----------

/// The currencies and pairs the oracle is initialized with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OracleConfig {
    /// The currencies known to the oracle
    #[serde(default)]
    pub currencies: Vec<CurrencyConfig>,
    /// The pairs priced by the oracle
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
}

/// A currency entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyConfig {
    /// The currency identifier, at most 31 bytes
    pub id: String,
    /// The number of decimals prices in this currency carry
    pub decimals: u8,
    /// Whether the currency has no token on chain
    #[serde(default)]
    pub is_abstract_currency: bool,
    /// The token address, zero when omitted
    #[serde(default)]
    pub ethereum_address: Option<String>,
}

/// A pair entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PairConfig {
    /// The pair identifier, at most 31 bytes
    pub id: String,
    /// The id of the quote currency
    pub quote_currency_id: String,
    /// The id of the base currency
    pub base_currency_id: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            currencies: vec![
                CurrencyConfig {
                    id: "USD".to_string(),
                    decimals: 8,
                    is_abstract_currency: true,
                    ethereum_address: None,
                },
                CurrencyConfig {
                    id: "ETH".to_string(),
                    decimals: 18,
                    is_abstract_currency: true,
                    ethereum_address: None,
                },
            ],
            pairs: vec![PairConfig {
                id: "ETH/USD".to_string(),
                quote_currency_id: "ETH".to_string(),
                base_currency_id: "USD".to_string(),
            }],
        }
    }
}

impl FromStr for OracleConfig {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| ScriptError::Configuration(e.to_string()))
    }
}

impl OracleConfig {
    /// Read the oracle configuration from disk, or use the default one
    pub fn load(path: Option<&Path>) -> Result<Self, ScriptError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path).map_err(|e| {
            ScriptError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        contents.parse()
    }

    /// Check that ids are unique and that every pair references known currencies
    pub fn validate(&self) -> Result<(), ScriptError> {
        if let Some(dup) = self.currencies.iter().map(|c| &c.id).duplicates().next() {
            return Err(ScriptError::Configuration(format!("duplicate currency id `{dup}`")));
        }
        if let Some(dup) = self.pairs.iter().map(|p| &p.id).duplicates().next() {
            return Err(ScriptError::Configuration(format!("duplicate pair id `{dup}`")));
        }

        for pair in &self.pairs {
            for currency_id in [&pair.quote_currency_id, &pair.base_currency_id] {
                if !self.currencies.iter().any(|c| &c.id == currency_id) {
                    return Err(ScriptError::Configuration(format!(
                        "pair `{}` references unknown currency `{currency_id}`",
                        pair.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// The currencies as initializer arguments
    pub fn currency_descriptors(&self) -> Result<Vec<Currency>, ScriptError> {
        self.currencies
            .iter()
            .map(|c| {
                let ethereum_address = match &c.ethereum_address {
                    Some(addr) => Address::from_str(addr).map_err(|e| {
                        ScriptError::Configuration(format!("currency `{}`: {e}", c.id))
                    })?,
                    None => Address::ZERO,
                };

                Ok(Currency {
                    id: format_bytes32_string(&c.id)?,
                    decimals: U256::from(c.decimals),
                    isAbstractCurrency: c.is_abstract_currency,
                    ethereumAddress: ethereum_address,
                })
            })
            .collect()
    }

    /// The pairs as initializer arguments
    pub fn pair_descriptors(&self) -> Result<Vec<Pair>, ScriptError> {
        self.pairs
            .iter()
            .map(|p| {
                Ok(Pair {
                    id: format_bytes32_string(&p.id)?,
                    quoteCurrencyId: format_bytes32_string(&p.quote_currency_id)?,
                    baseCurrencyId: format_bytes32_string(&p.base_currency_id)?,
                })
            })
            .collect()
    }
}
