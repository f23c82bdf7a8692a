//! Session context owned by the hosting application

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::Result;

use crate::config::Config;
use crate::domain::abi::DecodedCall;
use crate::domain::assets::{AssetRegistry, TokenInfo};
use crate::error::{DecodeError, ReconcileError};
use crate::infrastructure::abi::{
    AlloyCalldataDecoder, CallResolver, FourByteDirectory, SignatureDirectory,
};
use crate::infrastructure::assets::{AssetReconciler, ReconcilerOptions};
use crate::infrastructure::ethereum::{create_provider, ChainAccess, ContractReader};
use crate::store::{AssetStore, LookupCache};

/// Collaborators a [`Context`] is assembled from
pub struct ContextParts {
    pub chain: Arc<dyn ChainAccess>,
    pub directory: Arc<dyn SignatureDirectory>,
    pub lookup_cache: LookupCache,
    pub asset_store: Arc<AssetStore>,
    pub call_timeout: Duration,
    pub reconciler: ReconcilerOptions,
}

/// Everything one session needs: calldata resolution and asset tracking.
///
/// Independent contexts share no state, so several accounts or sessions
/// can be served side by side.
pub struct Context {
    resolver: CallResolver,
    assets: AssetReconciler,
    endpoint: String,
}

impl Context {
    pub fn new(parts: ContextParts) -> Self {
        let endpoint = parts.chain.endpoint_name();
        let reader = ContractReader::new(parts.chain, parts.call_timeout);
        Self {
            resolver: CallResolver::new(
                parts.directory,
                Arc::new(AlloyCalldataDecoder::new()),
                parts.lookup_cache,
            ),
            assets: AssetReconciler::new(reader, parts.asset_store, parts.reconciler),
            endpoint,
        }
    }

    /// Build a context from configuration: alloy provider, 4byte client and
    /// SQLite stores in the data directory
    pub async fn open(config: &Config) -> Result<Self> {
        let provider = create_provider(config.provider_config()).await?;
        let directory = FourByteDirectory::new(config.directory_url(), config.call_timeout())?;

        let lookup_cache = match config.lookup_db_path() {
            Some(path) => {
                ensure_parent(&path);
                LookupCache::open(&path)?
            }
            None => {
                tracing::warn!("no data directory, lookup cache kept in memory");
                LookupCache::open_in_memory()?
            }
        };
        let asset_store = match config.assets_db_path() {
            Some(path) => {
                ensure_parent(&path);
                AssetStore::open(&path)?
            }
            None => {
                tracing::warn!("no data directory, asset registry kept in memory");
                AssetStore::open_in_memory()?
            }
        };

        Ok(Self::new(ContextParts {
            chain: Arc::new(provider),
            directory: Arc::new(directory),
            lookup_cache,
            asset_store: Arc::new(asset_store),
            call_timeout: config.call_timeout(),
            reconciler: ReconcilerOptions {
                samples: config.sample_tokens(),
                concurrency: config.probe_concurrency(),
                max_age: config.registry_max_age(),
            },
        }))
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint
    }

    /// Human-readable description of raw calldata
    pub async fn decode_calldata(&self, hex: &str) -> Result<DecodedCall, DecodeError> {
        self.resolver.decode(hex).await
    }

    /// Connect event: reuse this account's persisted registry when still valid
    pub async fn connect(&self, owner: Address) -> Result<AssetRegistry, ReconcileError> {
        self.assets.restore_or_reconcile(owner).await
    }

    /// Rebuild this account's registry from chain and local state
    pub async fn reconcile_assets(&self, owner: Address) -> Result<AssetRegistry, ReconcileError> {
        self.assets.reconcile(owner).await
    }

    pub async fn classify_asset(&self, address: Address, owner: Option<Address>) -> Option<TokenInfo> {
        self.assets.classify(address, owner).await
    }

    /// Remember a token deployed in this session
    pub fn track_created_token(&self, address: Address) -> Result<bool> {
        let added = self.assets.track_created(&address)?;
        if added {
            tracing::info!(%address, "tracking created token");
        }
        Ok(added)
    }

    pub fn created_tokens(&self) -> Result<Vec<Address>> {
        self.assets.created_tokens()
    }

    /// Registry held in memory for `owner`, if reconciled or restored
    pub async fn registry(&self, owner: Address) -> Option<AssetRegistry> {
        self.assets.registry(&owner).await
    }
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            tracing::warn!(dir = %parent.display(), "cannot create data dir: {err}");
        }
    }
}
