//! Store-backed IPv4 address-pool allocation engine.
//!
//! Pools and reservations live entirely in a strongly consistent key-value
//! store, so independent allocator processes can share one address space
//! without talking to each other.
//!
//! ## Components
//!
//! - [`PoolRegistry`]: create, look up, and delete pool records
//! - [`AddressAllocator`]: reserve, release, and search for addresses
//! - [`verified`]: pure key-layout and address arithmetic
//!
//! ## Example
//!
//! ```ignore
//! use ipam_pool::{AddressAllocator, AddressRequest, PoolRegistry};
//!
//! let registry = PoolRegistry::new(store.clone(), "/ipam");
//! let allocator = AddressAllocator::new(store, "/ipam");
//!
//! let pool = registry.create_pool("net1", "10.0.1.0/24".parse()?, Default::default()).await?;
//! let addr = allocator.allocate(&pool, AddressRequest::any()).await?;
//! assert_eq!(addr.to_string(), "10.0.1.1/24");
//! ```

pub mod allocator;
pub mod error;
mod helpers;
pub mod registry;
pub mod types;
pub mod verified;

pub use allocator::AddressAllocator;
pub use error::IpamError;
pub use error::StoreErrorClass;
pub use error::classify_store_error;
pub use registry::PoolRegistry;
pub use registry::RegistryConfig;
pub use types::AddressKind;
pub use types::AddressRequest;
pub use types::Pool;
pub use types::PoolOptions;
