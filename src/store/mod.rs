//! SQLite-backed persistence

mod assets;
mod lookup_cache;

pub use assets::{AssetStore, StoredRegistry};
pub use lookup_cache::LookupCache;
