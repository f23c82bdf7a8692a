//! Per-account asset registry reconciliation

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use crate::domain::assets::{AssetRegistry, AssetStandard, Classification, TokenInfo};
use crate::error::ReconcileError;
use crate::infrastructure::ethereum::{erc725, ContractReader};
use crate::store::{AssetStore, StoredRegistry};

use super::AssetClassifier;

/// Reconciler settings
#[derive(Debug, Clone)]
pub struct ReconcilerOptions {
    /// Always-included demo token addresses
    pub samples: Vec<Address>,
    /// Addresses probed at the same time
    pub concurrency: usize,
    /// Persisted registries older than this are rebuilt on connect
    pub max_age: Option<Duration>,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            concurrency: 4,
            max_age: None,
        }
    }
}

/// Owns the created-token list and every account's registry
pub struct AssetReconciler {
    reader: ContractReader,
    classifier: AssetClassifier,
    store: Arc<AssetStore>,
    options: ReconcilerOptions,
    registries: RwLock<HashMap<Address, AssetRegistry>>,
}

impl AssetReconciler {
    pub fn new(reader: ContractReader, store: Arc<AssetStore>, options: ReconcilerOptions) -> Self {
        Self {
            classifier: AssetClassifier::new(reader.clone()),
            reader,
            store,
            options,
            registries: RwLock::new(HashMap::new()),
        }
    }

    /// Connect-time entry point: reuse a valid persisted registry, else rebuild
    pub async fn restore_or_reconcile(&self, owner: Address) -> Result<AssetRegistry, ReconcileError> {
        match self.store.load_registry(&owner) {
            Ok(Some(stored)) if self.is_valid(&stored) => {
                tracing::info!(%owner, assets = stored.registry.assets.len(), "restored asset registry");
                self.registries
                    .write()
                    .await
                    .insert(owner, stored.registry.clone());
                return Ok(stored.registry);
            }
            Ok(Some(stored)) => {
                tracing::debug!(%owner, updated_at = %stored.updated_at, "persisted registry expired");
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%owner, "ignoring unreadable registry: {err:#}"),
        }
        self.reconcile(owner).await
    }

    /// Rebuild the registry of `owner` from chain and local state.
    ///
    /// Nothing is written until every candidate has been processed.
    pub async fn reconcile(&self, owner: Address) -> Result<AssetRegistry, ReconcileError> {
        let received = self
            .reader
            .fetch_address_array(owner, erc725::LSP5_RECEIVED_ASSETS)
            .await
            .map_err(|err| {
                tracing::warn!(%owner, "abandoning reconciliation: {err:#}");
                ReconcileError::Abandoned(format!("{err:#}"))
            })?;
        let created = self.store.created_tokens()?;

        let assets = candidates(&received, &created, &self.options.samples);
        let owned: HashSet<Address> = received.iter().copied().collect();
        tracing::debug!(%owner, candidates = assets.len(), owned = owned.len(), "reconciling assets");

        let classifier = &self.classifier;
        let results: Vec<(Classification, Classification)> = stream::iter(assets.iter().copied())
            .map(|address| {
                let is_owned = owned.contains(&address);
                async move {
                    tokio::join!(
                        classifier.describe(address, AssetStandard::Lsp7DigitalAsset, Some(owner), is_owned),
                        classifier.describe(
                            address,
                            AssetStandard::Lsp8IdentifiableDigitalAsset,
                            Some(owner),
                            is_owned
                        ),
                    )
                }
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut lsp7 = Vec::new();
        let mut lsp8 = Vec::new();
        for (as_lsp7, as_lsp8) in results {
            keep(as_lsp7, &mut lsp7);
            keep(as_lsp8, &mut lsp8);
        }

        let registry = AssetRegistry { assets, lsp7, lsp8 };
        self.store.save_registry(&owner, &registry)?;
        self.registries.write().await.insert(owner, registry.clone());

        tracing::info!(
            %owner,
            assets = registry.assets.len(),
            lsp7 = registry.lsp7.len(),
            lsp8 = registry.lsp8.len(),
            "asset registry reconciled"
        );
        Ok(registry)
    }

    /// Describe a single address as the first asset standard it implements
    pub async fn classify(&self, address: Address, owner: Option<Address>) -> Option<TokenInfo> {
        let is_owned = match owner {
            Some(owner) => match self
                .reader
                .fetch_address_array(owner, erc725::LSP5_RECEIVED_ASSETS)
                .await
            {
                Ok(received) => received.contains(&address),
                Err(err) => {
                    tracing::debug!(%owner, "received assets unavailable: {err:#}");
                    false
                }
            },
            None => false,
        };

        for standard in AssetStandard::ASSETS {
            match self
                .classifier
                .describe(address, standard, owner, is_owned)
                .await
            {
                Ok(info) => return Some(info),
                Err(skip) => tracing::debug!(%address, "{skip}"),
            }
        }
        None
    }

    /// In-memory registry of an account reconciled or restored in this session
    pub async fn registry(&self, owner: &Address) -> Option<AssetRegistry> {
        self.registries.read().await.get(owner).cloned()
    }

    /// Remember a locally deployed token; false if it was already tracked
    pub fn track_created(&self, address: &Address) -> anyhow::Result<bool> {
        self.store.add_created_token(address)
    }

    pub fn created_tokens(&self) -> anyhow::Result<Vec<Address>> {
        self.store.created_tokens()
    }

    fn is_valid(&self, stored: &StoredRegistry) -> bool {
        let Some(max_age) = self.options.max_age else {
            return true;
        };
        match (Utc::now() - stored.updated_at).to_std() {
            Ok(age) => age <= max_age,
            // written in the future: clock skew
            Err(_) => true,
        }
    }
}

fn keep(classification: Classification, bucket: &mut Vec<TokenInfo>) {
    match classification {
        Ok(info) => bucket.push(info),
        Err(skip) => tracing::debug!("{skip}"),
    }
}

/// Received assets, then created tokens, then samples, without duplicates
pub fn candidates(received: &[Address], created: &[Address], samples: &[Address]) -> Vec<Address> {
    let mut seen = HashSet::new();
    received
        .iter()
        .chain(created)
        .chain(samples)
        .copied()
        .filter(|address| seen.insert(*address))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_union() {
        let a = Address::repeat_byte(0x0a);
        let b = Address::repeat_byte(0x0b);
        let c = Address::repeat_byte(0x0c);
        let s1 = Address::repeat_byte(0x51);
        let s2 = Address::repeat_byte(0x52);

        let merged = candidates(&[a, b], &[b, c], &[s1, s2]);
        assert_eq!(merged, vec![a, b, c, s1, s2]);
    }

    #[test]
    fn test_candidates_sample_already_received() {
        let a = Address::repeat_byte(0x0a);
        let s1 = Address::repeat_byte(0x51);

        assert_eq!(candidates(&[s1, a], &[], &[s1]), vec![s1, a]);
        assert!(candidates(&[], &[], &[]).is_empty());
    }
}
