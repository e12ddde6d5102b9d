//! Translation between the IPAM plugin protocol and the allocation engine.
//!
//! Every request is validated here before any store access. Engine errors
//! pass through unchanged so the transport can map them to its own codes.

pub mod types;

use std::net::Ipv4Addr;
use std::sync::Arc;

use ipam_constants::pool::GATEWAY_ADDRESS_TYPE;
use ipam_constants::pool::GLOBAL_ADDRESS_SPACE;
use ipam_constants::pool::LOCAL_ADDRESS_SPACE;
use ipam_constants::pool::NETWORK_NAME_OPTION;
use ipam_constants::pool::REQUEST_ADDRESS_TYPE_OPTION;
use ipam_pool::AddressAllocator;
use ipam_pool::AddressKind;
use ipam_pool::AddressRequest;
use ipam_pool::IpamError;
use ipam_pool::PoolRegistry;
use ipam_pool::RegistryConfig;
use ipam_pool::verified;
use ipam_traits::KeyValueStore;
use ipnet::Ipv4Net;
use tracing::debug;
use tracing::info;

pub use self::types::AddressSpacesResponse;
pub use self::types::CapabilitiesResponse;
pub use self::types::Options;
pub use self::types::ReleaseAddressRequest;
pub use self::types::ReleasePoolRequest;
pub use self::types::RequestAddressRequest;
pub use self::types::RequestAddressResponse;
pub use self::types::RequestPoolRequest;
pub use self::types::RequestPoolResponse;
use crate::config::IpamConfig;

/// Handles IPAM plugin requests against a shared store.
pub struct IpamHandler<S: KeyValueStore + ?Sized> {
    registry: PoolRegistry<S>,
    allocator: AddressAllocator<S>,
}

impl<S: KeyValueStore + ?Sized> Clone for IpamHandler<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            allocator: self.allocator.clone(),
        }
    }
}

impl<S: KeyValueStore + ?Sized + 'static> IpamHandler<S> {
    pub fn new(store: Arc<S>, config: RegistryConfig) -> Self {
        let allocator = AddressAllocator::new(Arc::clone(&store), config.namespace.clone());
        Self {
            registry: PoolRegistry::with_config(store, config),
            allocator,
        }
    }

    pub fn from_config(store: Arc<S>, config: &IpamConfig) -> Self {
        Self::new(store, config.registry_config())
    }

    pub fn registry(&self) -> &PoolRegistry<S> {
        &self.registry
    }

    pub fn allocator(&self) -> &AddressAllocator<S> {
        &self.allocator
    }

    /// Create (or overwrite) a pool named by the `network-name` option.
    pub async fn request_pool(&self, request: RequestPoolRequest) -> Result<RequestPoolResponse, IpamError> {
        info!(pool = %request.pool, v6 = request.v6, "request pool");

        let name = request
            .options
            .get(NETWORK_NAME_OPTION)
            .cloned()
            .ok_or_else(|| IpamError::invalid("network-name is required"))?;
        if request.v6 {
            return Err(IpamError::invalid("IPv6 pools are not supported"));
        }
        if request.pool.is_empty() {
            return Err(IpamError::invalid("Pool is required"));
        }
        let network: Ipv4Net =
            request.pool.parse().map_err(|_| IpamError::invalid(format!("Pool is invalid: {}", request.pool)))?;
        verified::check_pool_name(&name).map_err(IpamError::invalid)?;

        let pool = self.registry.create_pool(&name, network, request.options).await?;

        Ok(RequestPoolResponse {
            pool_id: pool.id,
            pool: pool.network.to_string(),
            data: pool.options,
        })
    }

    pub async fn release_pool(&self, request: ReleasePoolRequest) -> Result<(), IpamError> {
        info!(pool_id = %request.pool_id, "release pool");
        check_pool_id(&request.pool_id)?;
        self.registry.delete_pool(&request.pool_id).await
    }

    /// Reserve an address, or hand out a gateway without reserving it when
    /// the pool allows that.
    pub async fn request_address(&self, request: RequestAddressRequest) -> Result<RequestAddressResponse, IpamError> {
        info!(pool_id = %request.pool_id, address = %request.address, "request address");

        check_pool_id(&request.pool_id)?;
        let address = parse_address(&request.address)?;

        let pool = self.registry.get_pool(&request.pool_id).await?;
        if let Some(addr) = address
            && !pool.contains(addr)
        {
            return Err(IpamError::invalid(format!("address {addr} is outside pool {}", pool.network)));
        }

        let kind = match request.options.get(REQUEST_ADDRESS_TYPE_OPTION).map(String::as_str) {
            Some(GATEWAY_ADDRESS_TYPE) => AddressKind::Gateway,
            _ => AddressKind::Endpoint,
        };

        let assigned = self.allocator.allocate(&pool, AddressRequest { address, kind }).await?;
        debug!(pool_id = %pool.id, %assigned, "address assigned");

        Ok(RequestAddressResponse {
            address: assigned.to_string(),
            data: Options::new(),
        })
    }

    pub async fn release_address(&self, request: ReleaseAddressRequest) -> Result<(), IpamError> {
        info!(pool_id = %request.pool_id, address = %request.address, "release address");

        check_pool_id(&request.pool_id)?;
        let address =
            parse_address(&request.address)?.ok_or_else(|| IpamError::invalid("Address is required"))?;
        self.allocator.release_ip(&request.pool_id, address).await
    }

    pub fn capabilities(&self) -> CapabilitiesResponse {
        CapabilitiesResponse {
            requires_mac_address: true,
            requires_request_replay: false,
        }
    }

    pub fn default_address_spaces(&self) -> AddressSpacesResponse {
        AddressSpacesResponse {
            local_default_address_space: LOCAL_ADDRESS_SPACE.to_string(),
            global_default_address_space: GLOBAL_ADDRESS_SPACE.to_string(),
        }
    }
}

/// Pool ids must be a single key segment.
fn check_pool_id(pool_id: &str) -> Result<(), IpamError> {
    verified::check_pool_name(pool_id).map_err(IpamError::invalid)
}

/// Parse `a.b.c.d` or `a.b.c.d/len`; an empty string means "no address".
fn parse_address(raw: &str) -> Result<Option<Ipv4Addr>, IpamError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let host = raw.split_once('/').map_or(raw, |(host, _)| host);
    host.parse()
        .map(Some)
        .map_err(|_| IpamError::invalid(format!("Address is invalid: {raw}")))
}
