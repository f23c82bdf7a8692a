//! ABI infrastructure - signature directory, alloy-based decoding, call resolution

mod decoder;
mod directory;
mod resolver;

pub use decoder::AlloyCalldataDecoder;
pub use directory::{FourByteDirectory, SignatureDirectory, DEFAULT_DIRECTORY_URL};
pub use resolver::CallResolver;
