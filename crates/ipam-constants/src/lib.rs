//! Centralized constants for the IPAM workspace.
//!
//! Constants are grouped by the layer that owns them so callers can find a
//! limit next to the code it bounds.
//!
//! Tiger Style: Constants are fixed and immutable, enforced at compile time.
//! Each constant has explicit bounds to prevent unbounded resource allocation.
//!
//! # Modules
//!
//! - [`api`]: Key-value store bounds (key/value sizes, scan results)
//! - [`pool`]: Pool allocation engine (key layout, option keys, defaults)
//!
//! # Usage
//!
//! ```
//! use ipam_constants::api::MAX_KEY_SIZE;
//! use ipam_constants::pool::DEFAULT_NAMESPACE;
//! ```

pub mod api;
mod assertions;
pub mod pool;

// Re-export commonly used constants at crate root
pub use api::DEFAULT_SCAN_LIMIT;
pub use api::MAX_KEY_SIZE;
pub use api::MAX_SCAN_RESULTS;
pub use api::MAX_SETMULTI_KEYS;
pub use api::MAX_VALUE_SIZE;
pub use pool::DEFAULT_NAMESPACE;
pub use pool::DEFAULT_STORE_TIMEOUT_MS;
