//! Ethereum infrastructure - chain access, contract interfaces, ERC725Y helpers

pub mod contracts;
pub mod erc725;
mod provider;
mod reader;

pub use provider::{create_provider, AlloyProvider, ChainAccess, ProviderConfig};
pub use reader::ContractReader;
