//! IPAM driver library.
//!
//! Wires the pool allocation engine (`ipam-pool`) to a container runtime's
//! IPAM plugin contract. A host process loads an [`IpamConfig`], initializes
//! logging with [`telemetry::init_tracing`], wraps its store client in a
//! [`TimeoutKeyValueStore`], and serves requests through [`IpamHandler`].
//!
//! ```ignore
//! let config = IpamConfig::load_with_layers(None)?;
//! ipam::telemetry::init_tracing(config.log_filter.as_deref());
//!
//! let store = Arc::new(TimeoutKeyValueStore::new(client, config.store_timeout()));
//! let handler = IpamHandler::from_config(store, &config);
//! ```

pub mod adapter;
pub mod config;
pub mod store;
pub mod telemetry;

pub use adapter::IpamHandler;
pub use config::ConfigError;
pub use config::IpamConfig;
pub use store::TimeoutKeyValueStore;
