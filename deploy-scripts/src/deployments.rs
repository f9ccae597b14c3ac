//! Reading and writing deployed addresses in the `deployments.json` file
//!
//! The file is an address book only: a deployment records every contract as
//! soon as it is live, but never consults the file to skip or reuse a step.

use std::{fs, path::Path, str::FromStr};

use alloy::primitives::Address;
use serde_json::{Map, Value};

use crate::{constants::DEPLOYMENTS_KEY, errors::ScriptError};

/// Read the deployments file, or an empty document if it does not exist
fn read_deployments_file(file_path: &Path) -> Result<Value, ScriptError> {
    if !file_path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents =
        fs::read_to_string(file_path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Read a deployed address from the deployments file
pub fn read_deployed_address(file_path: &Path, contract_key: &str) -> Result<Address, ScriptError> {
    let parsed_json = read_deployments_file(file_path)?;

    let addr_str = parsed_json[DEPLOYMENTS_KEY][contract_key].as_str().ok_or_else(|| {
        ScriptError::ReadDeployments(format!(
            "{contract_key} not found in {}",
            file_path.display()
        ))
    })?;

    Address::from_str(addr_str).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Record a deployed address in the deployments file, creating it if needed
pub fn write_deployed_address(
    file_path: &Path,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut parsed_json = read_deployments_file(file_path)?;

    let root = parsed_json.as_object_mut().ok_or_else(|| {
        ScriptError::WriteDeployments(format!("{} is not a JSON object", file_path.display()))
    })?;
    let deployments = root
        .entry(DEPLOYMENTS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            ScriptError::WriteDeployments(format!("`{DEPLOYMENTS_KEY}` is not a JSON object"))
        })?;
    deployments.insert(contract_key.to_string(), Value::String(format!("{address:#x}")));

    let contents = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;
    use crate::constants::{ORACLE_CONTRACT_KEY, ORACLE_PROXY_CONTRACT_KEY};

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.test.json");
        let oracle = address!("0x00000000000000000000000000000000000000a3");
        let proxy = address!("0x00000000000000000000000000000000000000a4");

        write_deployed_address(&path, ORACLE_CONTRACT_KEY, oracle).unwrap();
        write_deployed_address(&path, ORACLE_PROXY_CONTRACT_KEY, proxy).unwrap();

        assert_eq!(read_deployed_address(&path, ORACLE_CONTRACT_KEY).unwrap(), oracle);
        assert_eq!(read_deployed_address(&path, ORACLE_PROXY_CONTRACT_KEY).unwrap(), proxy);
    }

    #[test]
    fn test_overwrite_keeps_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.test.json");
        fs::write(&path, r#"{ "network": "bsctest", "deployments": {} }"#).unwrap();

        let first = address!("0x00000000000000000000000000000000000000a3");
        let second = address!("0x00000000000000000000000000000000000000b3");
        write_deployed_address(&path, ORACLE_CONTRACT_KEY, first).unwrap();
        write_deployed_address(&path, ORACLE_CONTRACT_KEY, second).unwrap();

        assert_eq!(read_deployed_address(&path, ORACLE_CONTRACT_KEY).unwrap(), second);
        let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["network"], "bsctest");
    }

    #[test]
    fn test_read_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.test.json");

        assert!(matches!(
            read_deployed_address(&path, ORACLE_CONTRACT_KEY),
            Err(ScriptError::ReadDeployments(_))
        ));
    }
}
