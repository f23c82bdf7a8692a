//! ERC725Y data keys (LSP2) and value decoding

use alloy::primitives::{keccak256, Address, FixedBytes, B256};
use anyhow::{bail, Result};

/// Key name of the LSP5 received-assets array
pub const LSP5_RECEIVED_ASSETS: &str = "LSP5ReceivedAssets[]";
pub const LSP4_TOKEN_NAME: &str = "LSP4TokenName";
pub const LSP4_TOKEN_SYMBOL: &str = "LSP4TokenSymbol";

/// Arrays longer than this are treated as corrupt data
pub const MAX_ARRAY_LENGTH: u128 = 10_000;

/// Key for a singleton name, or the length key for an array name ("Name[]")
pub fn data_key(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// Key of element `index` in an LSP2 array: first 16 bytes of the length key
/// followed by the index as uint128
pub fn array_element_key(length_key: &B256, index: u128) -> B256 {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(&length_key[..16]);
    key[16..].copy_from_slice(&index.to_be_bytes());
    B256::from(key)
}

/// LSP2 mapping key: `keccak256(first)[..10] ++ 0x0000 ++ keccak256(second)[..20]`
pub fn mapping_key(first: &str, second: &str) -> B256 {
    let first = keccak256(first.as_bytes());
    let second = keccak256(second.as_bytes());
    let mut key = [0u8; 32];
    key[..10].copy_from_slice(&first[..10]);
    key[12..].copy_from_slice(&second[..20]);
    B256::from(key)
}

/// Key and expected value of a `SupportedStandards:<name>` entry
pub fn supported_standard(name: &str) -> (B256, FixedBytes<4>) {
    let key = mapping_key("SupportedStandards", name);
    let value = FixedBytes::<4>::from_slice(&keccak256(name.as_bytes())[..4]);
    (key, value)
}

/// Decode an LSP2 array length. Current contracts store a uint128 (16 bytes),
/// older ones a full word; an unset key means an empty array.
pub fn decode_array_length(value: &[u8]) -> Result<u128> {
    let length = match value.len() {
        0 => 0,
        16 => u128::from_be_bytes(value.try_into()?),
        32 => {
            if value[..16].iter().any(|b| *b != 0) {
                bail!("array length does not fit in uint128");
            }
            u128::from_be_bytes(value[16..].try_into()?)
        }
        other => bail!("unexpected array length encoding ({other} bytes)"),
    };
    if length > MAX_ARRAY_LENGTH {
        bail!("array length {length} exceeds {MAX_ARRAY_LENGTH}");
    }
    Ok(length)
}

/// Decode an address array element (20 bytes, or left-padded to 32)
pub fn decode_address(value: &[u8]) -> Result<Address> {
    match value.len() {
        20 => Ok(Address::from_slice(value)),
        32 if value[..12].iter().all(|b| *b == 0) => Ok(Address::from_slice(&value[12..])),
        other => bail!("unexpected address encoding ({other} bytes)"),
    }
}

/// Decode a string value, treating empty or non-UTF-8 data as absent
pub fn decode_string(value: &[u8]) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    String::from_utf8(value.to_vec()).ok()
}
