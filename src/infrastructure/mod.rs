//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based chain access and ERC725Y reads
//! - Signature directory client and alloy-dyn-abi calldata decoding
//! - Asset standard probing, classification and reconciliation

pub mod abi;
pub mod assets;
pub mod ethereum;
