//! Calldata decoder trait and types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A candidate text signature returned by the signature directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSignature {
    /// Directory record id, when the directory provides one
    pub id: Option<u64>,
    /// Text signature, e.g. "transfer(address,uint256)"
    pub text: String,
}

impl SelectorSignature {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }
}

/// A decoded function argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedArgument {
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)[]")
    #[serde(rename = "type")]
    pub kind: String,
    /// Positional name, "arg1" for the first argument
    pub name: String,
    /// Decoded value as a display string
    pub value: String,
    /// Set for bytes32 arguments of setData/getData, which are ERC725Y keys
    pub is_key_like: bool,
}

/// Result of a verified decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedCall {
    /// Display label, "Decoded {signature}"
    pub label: String,
    /// Function name (signature text up to the first '(')
    pub function_name: String,
    /// Signature that survived round-trip verification
    pub signature: String,
    /// Decoded arguments in declaration order
    pub arguments: Vec<DecodedArgument>,
}

/// Why a candidate signature was not accepted for a payload.
///
/// Rejections are the expected outcome for most candidates and are never
/// surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("malformed signature: {0}")]
    Signature(String),

    #[error("unsupported parameter type '{kind}': {reason}")]
    UnsupportedType { kind: String, reason: String },

    #[error("payload too short for parameter {index}")]
    Truncated { index: usize },

    #[error("parameter {index} is a bool but the word is not 0 or 1")]
    InvalidBool { index: usize },

    #[error("parameter {index} is an address but the word has dirty high bytes")]
    InvalidAddress { index: usize },

    #[error("ABI decoding failed: {0}")]
    Decode(String),

    #[error("re-encoded arguments differ from the payload")]
    RoundTripMismatch,
}

/// Trait for calldata decoding implementations
///
/// An implementation must only return `Ok` when re-encoding the decoded
/// arguments reproduces `payload` byte for byte.
pub trait CalldataDecoder: Send + Sync {
    /// Try to decode the bytes following the selector against a text signature
    ///
    /// # Arguments
    /// * `signature` - Candidate text signature, e.g. "mint(address,uint256)"
    /// * `payload` - Calldata bytes after the 4-byte selector
    fn try_decode(&self, signature: &str, payload: &[u8]) -> Result<DecodedCall, Rejection>;
}
