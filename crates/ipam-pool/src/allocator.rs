//! Address reservation within a pool.
//!
//! Admission control is a single conditional create per address: the store
//! guarantees that of any number of concurrent creates for one reservation
//! key, exactly one succeeds. Free-address search lists the current
//! reservations and then tries candidates in ascending order, moving on
//! whenever another allocator won the race for a candidate.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

use ipam_constants::pool::DEFAULT_NAMESPACE;
use ipam_constants::pool::RESERVATION_MARKER;
use ipam_constants::pool::RESERVATION_SCAN_PAGE;
use ipam_kv_types::WriteRequest;
use ipam_traits::KeyValueStore;
use ipnet::Ipv4Net;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::IpamError;
use crate::error::StoreErrorClass;
use crate::error::classify_store_error;
use crate::helpers;
use crate::types::AddressKind;
use crate::types::AddressRequest;
use crate::types::Pool;
use crate::verified;

/// Reserves, releases, and searches for addresses in pools.
pub struct AddressAllocator<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    namespace: String,
}

impl<S: KeyValueStore + ?Sized> Clone for AddressAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            namespace: self.namespace.clone(),
        }
    }
}

impl<S: KeyValueStore + ?Sized + 'static> AddressAllocator<S> {
    /// Create an allocator over `namespace`.
    pub fn new(store: Arc<S>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// Create an allocator over the default namespace.
    pub fn with_default_namespace(store: Arc<S>) -> Self {
        Self::new(store, DEFAULT_NAMESPACE)
    }

    /// Route a request to the right reservation path.
    ///
    /// - gateway with an address, pool allows gateway assignment: [`dont_reserve_ip`](Self::dont_reserve_ip)
    /// - any request with an address: [`reserve_ip`](Self::reserve_ip)
    /// - no address: [`reserve_free_ip`](Self::reserve_free_ip)
    pub async fn allocate(&self, pool: &Pool, request: AddressRequest) -> Result<Ipv4Net, IpamError> {
        match (request.address, request.kind) {
            (Some(address), AddressKind::Gateway) if pool.allows_gateway_assignment() => {
                Ok(self.dont_reserve_ip(pool, address))
            }
            (Some(address), _) => self.reserve_ip(pool, address).await,
            (None, _) => self.reserve_free_ip(pool).await,
        }
    }

    /// Atomically claim `address` in `pool`.
    ///
    /// Fails with [`IpamError::AddressInUse`] if the address is already
    /// reserved, including by a concurrent caller that won the race.
    pub async fn reserve_ip(&self, pool: &Pool, address: Ipv4Addr) -> Result<Ipv4Net, IpamError> {
        let key = verified::reservation_key(&self.namespace, &pool.id, address);

        match self.store.write(WriteRequest::create_if_absent(key.as_str(), RESERVATION_MARKER)).await {
            Ok(_) => {
                debug!(pool_id = %pool.id, %address, "address reserved");
                Ok(verified::format_address(address, pool.prefix_len()))
            }
            Err(e) => match classify_store_error(&e) {
                StoreErrorClass::AlreadyExists => Err(IpamError::AddressInUse {
                    pool_id: pool.id.clone(),
                    address: address.to_string(),
                }),
                _ => Err(e.into()),
            },
        }
    }

    /// Claim the lowest free address in `pool`.
    ///
    /// Makes at most one ascending pass over the usable hosts. Candidates lost
    /// to concurrent allocators are skipped; any other store error ends the
    /// search immediately.
    pub async fn reserve_free_ip(&self, pool: &Pool) -> Result<Ipv4Net, IpamError> {
        let reserved = self.reserved_addresses(&pool.id).await?;

        for candidate in verified::usable_hosts(pool.network) {
            if reserved.contains(&candidate) {
                continue;
            }
            match self.reserve_ip(pool, candidate).await {
                Ok(address) => return Ok(address),
                Err(IpamError::AddressInUse { .. }) => {
                    debug!(pool_id = %pool.id, %candidate, "candidate taken concurrently, advancing");
                }
                Err(e) => return Err(e),
            }
        }

        Err(IpamError::PoolExhausted {
            pool_id: pool.id.clone(),
            network: pool.network.to_string(),
        })
    }

    /// Hand out `address` without recording a reservation.
    ///
    /// The address remains free as far as the store is concerned, so a later
    /// ordinary request can claim it.
    pub fn dont_reserve_ip(&self, pool: &Pool, address: Ipv4Addr) -> Ipv4Net {
        info!(pool_id = %pool.id, %address, "gateway address assigned without reservation");
        verified::format_address(address, pool.prefix_len())
    }

    /// Release a reservation. Releasing a free address succeeds.
    pub async fn release_ip(&self, pool_id: &str, address: Ipv4Addr) -> Result<(), IpamError> {
        let key = verified::reservation_key(&self.namespace, pool_id, address);
        let existed = helpers::delete_key(self.store.as_ref(), &key).await?;
        debug!(pool_id, %address, existed, "address released");
        Ok(())
    }

    /// Addresses currently reserved in a pool, as listed by the store.
    pub async fn reserved_addresses(&self, pool_id: &str) -> Result<HashSet<Ipv4Addr>, IpamError> {
        let prefix = verified::reservations_prefix(&self.namespace, pool_id);
        let keys = helpers::scan_all_keys(self.store.as_ref(), &prefix, RESERVATION_SCAN_PAGE).await?;

        let mut reserved = HashSet::with_capacity(keys.len());
        for key in keys {
            match verified::parse_reservation_key(&prefix, &key) {
                Some(address) => {
                    reserved.insert(address);
                }
                None => warn!(pool_id, key = %key, "skipping unparsable reservation key"),
            }
        }
        Ok(reserved)
    }
}
