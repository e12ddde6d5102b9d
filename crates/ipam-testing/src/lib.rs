//! Testing infrastructure for the IPAM workspace.
//!
//! - [`DeterministicKeyValueStore`]: in-memory, strongly consistent store
//! - [`FaultyKeyValueStore`]: wraps a store and injects errors or latency
//! - [`ContendedKeyValueStore`]: wraps a store and wins conditional writes
//!   ahead of the caller, simulating a concurrent allocator on another host
//!
//! # Usage
//!
//! ```ignore
//! let store = DeterministicKeyValueStore::new();
//! let registry = PoolRegistry::new(store.clone(), "/ipam");
//! ```

mod contended;
mod deterministic;
mod faulty;

pub use contended::ContendedKeyValueStore;
pub use deterministic::DeterministicKeyValueStore;
pub use faulty::FaultTarget;
pub use faulty::FaultyKeyValueStore;
