//! Pool lifecycle: create, look up, and delete pool records.

use std::sync::Arc;

use ipam_constants::pool::DEFAULT_NAMESPACE;
use ipam_constants::pool::RESERVATION_SCAN_PAGE;
use ipam_traits::KeyValueStore;
use ipnet::Ipv4Net;
use tracing::debug;
use tracing::info;

use crate::error::IpamError;
use crate::helpers;
use crate::types::Pool;
use crate::types::PoolOptions;
use crate::verified;

/// Registry behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Key namespace all records live under.
    pub namespace: String,
    /// Remove a pool's reservations when the pool is deleted.
    pub purge_reservations: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            purge_reservations: true,
        }
    }
}

/// Manages pool records in the store.
///
/// Holds no pool state; every call reads or writes the store directly, so any
/// number of registries in any number of processes can share one namespace.
pub struct PoolRegistry<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    config: RegistryConfig,
}

impl<S: KeyValueStore + ?Sized> Clone for PoolRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: KeyValueStore + ?Sized + 'static> PoolRegistry<S> {
    /// Create a registry over `namespace` with cascading delete.
    pub fn new(store: Arc<S>, namespace: impl Into<String>) -> Self {
        Self::with_config(store, RegistryConfig {
            namespace: namespace.into(),
            ..RegistryConfig::default()
        })
    }

    /// Create a registry with explicit configuration.
    pub fn with_config(store: Arc<S>, config: RegistryConfig) -> Self {
        Self { store, config }
    }

    /// The namespace this registry writes under.
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Create or overwrite a pool record.
    ///
    /// Performs no validation; callers check names and networks first. The
    /// stored network has its host bits cleared.
    pub async fn create_pool(&self, name: &str, network: Ipv4Net, options: PoolOptions) -> Result<Pool, IpamError> {
        let pool = Pool::new(name, network, options);
        let key = verified::pool_key(&self.config.namespace, name);

        helpers::write_json(self.store.as_ref(), &key, &pool).await?;

        info!(pool_id = %pool.id, network = %pool.network, "pool created");
        Ok(pool)
    }

    /// Load a pool record.
    pub async fn get_pool(&self, pool_id: &str) -> Result<Pool, IpamError> {
        let key = verified::pool_key(&self.config.namespace, pool_id);
        match helpers::read_json::<Pool, _>(self.store.as_ref(), &key).await? {
            Some(pool) => Ok(pool),
            None => Err(IpamError::PoolNotFound {
                pool_id: pool_id.to_string(),
            }),
        }
    }

    /// Delete a pool record, and its reservations unless purging is disabled.
    ///
    /// Deleting a pool that does not exist succeeds. The record goes first, so
    /// a failure while purging leaves orphaned reservations but never a pool
    /// whose addresses look free.
    pub async fn delete_pool(&self, pool_id: &str) -> Result<(), IpamError> {
        let key = verified::pool_key(&self.config.namespace, pool_id);
        let existed = helpers::delete_key(self.store.as_ref(), &key).await?;

        let purged = if self.config.purge_reservations {
            self.purge_reservations(pool_id).await?
        } else {
            0
        };

        info!(pool_id, existed, purged, "pool deleted");
        Ok(())
    }

    /// Remove every reservation under a pool. Returns the number removed.
    pub async fn purge_reservations(&self, pool_id: &str) -> Result<u32, IpamError> {
        let prefix = verified::reservations_prefix(&self.config.namespace, pool_id);
        let keys = helpers::scan_all_keys(self.store.as_ref(), &prefix, RESERVATION_SCAN_PAGE).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let removed = helpers::delete_keys(self.store.as_ref(), keys).await?;
        debug!(pool_id, removed, "reservations purged");
        Ok(removed)
    }
}
