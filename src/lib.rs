//! Calldata decoding and LUKSO asset discovery.
//!
//! [`Context`] is the entry point: it resolves raw calldata into verified
//! function calls and keeps a per-account registry of LSP7/LSP8 assets.

pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod store;

pub use crate::core::{Context, ContextParts};
pub use crate::domain::abi::{DecodedArgument, DecodedCall};
pub use crate::domain::assets::{AssetRegistry, AssetStandard, TokenInfo};
pub use crate::error::{DecodeError, DirectoryError, ReconcileError};
