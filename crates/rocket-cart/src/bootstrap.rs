//! Wiring a [`CartStore`] from configuration.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rocket_cache::Cache;
use rocket_data::{DependencyTag, FetchClient, HttpCatalog};

use crate::config::{CartConfig, StorageBackend, StorageConfig};
use crate::store::CartStore;

impl CartStore {
    /// Build a store that talks to the storefront API over HTTP and persists
    /// to the configured backend.
    pub fn from_config(config: &CartConfig) -> Result<CartStore> {
        let client = FetchClient::with_reqwest(
            config.api.base_url.as_str(),
            config.api.connect_timeout(),
        )
        .context("Failed to build HTTP client")?
            .with_policy(
                DependencyTag::Inventory,
                config.api.policy_for(DependencyTag::Inventory),
            )
            .with_policy(
                DependencyTag::Catalog,
                config.api.policy_for(DependencyTag::Catalog),
            );
        let catalog = Arc::new(HttpCatalog::new(client));

        let cache = open_cache(&config.storage)?;
        let key = config.storage.storage_key();

        tracing::info!(
            api = %config.api.base_url,
            backend = ?config.storage.backend,
            key = %key,
            "cart store configured"
        );

        Ok(CartStore::open(cache, key, catalog.clone(), catalog))
    }
}

fn open_cache(storage: &StorageConfig) -> Result<Cache> {
    match storage.backend {
        StorageBackend::Memory => Ok(Cache::in_memory()),
        StorageBackend::File => Cache::open_dir(&storage.dir)
            .with_context(|| format!("Failed to open cart storage: {}", storage.dir.display())),
        StorageBackend::Spin => bail!("the spin storage backend is only available inside a Spin component"),
    }
}
