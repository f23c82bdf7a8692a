//! Domain layer - types and contracts independent of transports

pub mod abi;
pub mod assets;
