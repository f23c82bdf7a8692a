//! Asset domain models: standards, classified tokens and registries

mod standard;
mod token;

pub use standard::{AssetStandard, MethodFallback};
pub use token::{AssetRegistry, Classification, Skip, TokenInfo, UNDEFINED_TEXT};
