//! ABI domain models and contracts
//!
//! This module defines the traits and types for calldata decoding,
//! independent of the underlying implementation (alloy-dyn-abi).

mod decoder;
mod signature;

pub use decoder::{CalldataDecoder, DecodedArgument, DecodedCall, Rejection, SelectorSignature};
pub use signature::{function_name, parameter_types, SignatureError};
