//! Utilities for the deploy scripts.

use std::str::FromStr;

use alloy::primitives::{Address, Bytes, B256};

use crate::{
    constants::{MAX_IDENTIFIER_LEN, NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT},
    errors::ScriptError,
};

/// Encode a short string as a fixed-width identifier.
///
/// The UTF-8 bytes are right-padded with zeros to 32 bytes. At most 31 bytes
/// of text are accepted so that the identifier stays null-terminated.
pub fn format_bytes32_string(text: &str) -> Result<B256, ScriptError> {
    let bytes = text.as_bytes();
    if bytes.len() > MAX_IDENTIFIER_LEN {
        return Err(ScriptError::Configuration(format!(
            "identifier `{text}` is {} bytes long, at most {MAX_IDENTIFIER_LEN} are allowed",
            bytes.len()
        )));
    }

    let mut word = [0u8; NUM_BYTES_STORAGE_SLOT];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(word))
}

/// Decode a fixed-width identifier back into its text, stopping at the first null byte
pub fn parse_bytes32_string(id: &B256) -> Result<String, ScriptError> {
    let end = id.iter().position(|b| *b == 0).ok_or_else(|| {
        ScriptError::Configuration(format!("identifier {id} is not null-terminated"))
    })?;

    String::from_utf8(id[..end].to_vec()).map_err(|e| ScriptError::Configuration(e.to_string()))
}

/// Extract the address stored in the low-order bytes of a storage word
pub fn address_from_slot(word: B256) -> Address {
    Address::from_slice(&word[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..NUM_BYTES_STORAGE_SLOT])
}

/// Parse an address given on the command line
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// Parse hex calldata given on the command line
pub fn parse_calldata(calldata: &str) -> Result<Bytes, ScriptError> {
    Bytes::from_str(calldata).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}
