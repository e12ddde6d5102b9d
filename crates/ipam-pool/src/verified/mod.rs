//! Pure functions behind the allocation engine.
//!
//! This module implements the "Functional Core, Imperative Shell" (FCIS)
//! pattern: everything here is deterministic and side-effect free, and the
//! registry and allocator call into it for key layout and address arithmetic.
//!
//! # Module Organization
//!
//! - [`keys`]: Pool and reservation key construction and parsing
//! - [`address`]: Octet increment, usable-host range, address formatting
//!
//! # Tiger Style
//!
//! - Wrapping/checked arithmetic (no panics)
//! - Explicit types (u8, u32, not usize)
//! - Bounded iteration over a known number of candidates

pub mod address;
pub mod keys;

pub use address::UsableHosts;
pub use address::format_address;
pub use address::increment_addr;
pub use address::increment_octets;
pub use address::usable_count;
pub use address::usable_hosts;
pub use keys::check_pool_name;
pub use keys::parse_reservation_key;
pub use keys::pool_key;
pub use keys::reservation_key;
pub use keys::reservations_prefix;
