//! Loading contract bytecode from compilation artifacts
//!
//! Both Hardhat artifacts (`bytecode` / `deployedBytecode` as hex strings) and
//! Foundry artifacts (`bytecode.object` / `deployedBytecode.object`) are accepted.
//! Artifacts are looked up as `<Source>.sol/<Name>.json` anywhere below the
//! artifacts directory.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::{
    constants::{ARTIFACT_EXTENSION, MAX_CONTRACT_CODE_SIZE, MAX_INITCODE_SIZE, SOURCE_DIR_EXTENSION},
    errors::ScriptError,
    types::ContractRole,
};

/// The bytecode of a compiled contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    /// The contract name
    pub name: String,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
    /// The runtime bytecode, empty if the artifact does not carry it
    pub deployed_bytecode: Bytes,
}

/// The on-disk shape of an artifact, only the fields we need
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// The creation bytecode
    bytecode: RawBytecode,
    /// The runtime bytecode
    #[serde(default)]
    deployed_bytecode: Option<RawBytecode>,
}

/// Bytecode as a bare hex string (Hardhat) or nested under `object` (Foundry)
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// A hex string
    Hex(String),
    /// An object holding the hex string
    Object {
        /// The hex string
        object: String,
    },
}

impl RawBytecode {
    /// The hex string regardless of layout
    fn hex(&self) -> &str {
        match self {
            RawBytecode::Hex(s) => s,
            RawBytecode::Object { object } => object,
        }
    }
}

/// Decode an artifact's hex bytecode
fn decode_bytecode(name: &str, hex: &str) -> Result<Bytes, ScriptError> {
    // Unlinked library references are left as `__$<hash>$__` placeholders
    if hex.contains("__") {
        return Err(ScriptError::ArtifactParsing(format!(
            "{name} bytecode contains unlinked library references"
        )));
    }

    Bytes::from_str(hex).map_err(|e| ScriptError::ArtifactParsing(format!("{name}: {e}")))
}

impl ContractArtifact {
    /// Parse an artifact from its JSON contents
    pub fn from_json(name: &str, contents: &str) -> Result<Self, ScriptError> {
        let raw: RawArtifact = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{name}: {e}")))?;

        let bytecode = decode_bytecode(name, raw.bytecode.hex())?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{name} has no creation bytecode, is it abstract or an interface?"
            )));
        }

        let deployed_bytecode = match raw.deployed_bytecode {
            Some(raw) => decode_bytecode(name, raw.hex())?,
            None => Bytes::new(),
        };

        Ok(Self { name: name.to_string(), bytecode, deployed_bytecode })
    }

    /// Find and load the artifact for the given contract below `artifacts_dir`
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self, ScriptError> {
        let mut matches = Vec::new();
        find_artifact_files(artifacts_dir, name, &mut matches)?;

        let path = match matches.as_slice() {
            [path] => path,
            [] => {
                return Err(ScriptError::ArtifactParsing(format!(
                    "no artifact for {name} below {}",
                    artifacts_dir.display()
                )))
            }
            _ => {
                return Err(ScriptError::ArtifactParsing(format!(
                    "multiple artifacts for {name} below {}: {matches:?}",
                    artifacts_dir.display()
                )))
            }
        };

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        Self::from_json(name, &contents)
    }

    /// Check the artifact against the EIP-170 and EIP-3860 size ceilings.
    ///
    /// When the artifact does not carry runtime bytecode, the creation
    /// bytecode stands in for it.
    pub fn check_code_size(&self, constructor_args_len: usize) -> Result<(), ScriptError> {
        let runtime_len = if self.deployed_bytecode.is_empty() {
            self.bytecode.len()
        } else {
            self.deployed_bytecode.len()
        };

        if runtime_len > MAX_CONTRACT_CODE_SIZE {
            return Err(ScriptError::ContractSizeLimit(format!(
                "{} code is {runtime_len} bytes, the limit is {MAX_CONTRACT_CODE_SIZE}",
                self.name
            )));
        }

        let initcode_len = self.bytecode.len() + constructor_args_len;
        if initcode_len > MAX_INITCODE_SIZE {
            return Err(ScriptError::ContractSizeLimit(format!(
                "{} init code is {initcode_len} bytes, the limit is {MAX_INITCODE_SIZE}",
                self.name
            )));
        }

        Ok(())
    }
}

/// Recursively collect `<Source>.sol/<name>.json` files
fn find_artifact_files(
    dir: &Path,
    name: &str,
    matches: &mut Vec<PathBuf>,
) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", dir.display())))?;

    for entry in entries {
        let path = entry.map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?.path();
        if path.is_dir() {
            find_artifact_files(&path, name, matches)?;
            continue;
        }

        let is_artifact = path.file_stem().is_some_and(|stem| stem == name)
            && path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION)
            && dir.extension().is_some_and(|ext| ext == SOURCE_DIR_EXTENSION);
        if is_artifact {
            matches.push(path);
        }
    }

    Ok(())
}

/// The artifacts of every contract in the oracle system
#[derive(Debug, Clone)]
pub struct OracleArtifacts {
    /// The proxy admin artifact
    pub proxy_admin: ContractArtifact,
    /// The publisher registry artifact
    pub publisher_registry: ContractArtifact,
    /// The oracle implementation artifact
    pub oracle: ContractArtifact,
    /// The upgradeable proxy artifact
    pub proxy: ContractArtifact,
}

impl OracleArtifacts {
    /// Load all four artifacts from the artifacts directory
    pub fn load(artifacts_dir: &Path) -> Result<Self, ScriptError> {
        let load = |role: ContractRole| ContractArtifact::load(artifacts_dir, role.artifact_name());

        Ok(Self {
            proxy_admin: load(ContractRole::ProxyAdmin)?,
            publisher_registry: load(ContractRole::PublisherRegistry)?,
            oracle: load(ContractRole::Oracle)?,
            proxy: load(ContractRole::OracleProxy)?,
        })
    }

    /// The artifact for the given role
    pub fn get(&self, role: ContractRole) -> &ContractArtifact {
        match role {
            ContractRole::ProxyAdmin => &self.proxy_admin,
            ContractRole::PublisherRegistry => &self.publisher_registry,
            ContractRole::Oracle => &self.oracle,
            ContractRole::OracleProxy => &self.proxy,
        }
    }
}
