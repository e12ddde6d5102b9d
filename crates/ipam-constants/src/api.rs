//! Key-value store API bounds.
//!
//! These constants bound every request that reaches a store backend. They are
//! enforced by `ipam_kv_types::validate_write_command` and by the scan
//! implementations in `ipam-testing`.

// ============================================================================
// Key-Value Size Limits
// ============================================================================

/// Maximum size of a single key in bytes (1 KB).
///
/// Tiger Style: Fixed limit prevents memory exhaustion from oversized keys.
pub const MAX_KEY_SIZE: u32 = 1024;

/// Maximum size of a single value in bytes (1 MB).
pub const MAX_VALUE_SIZE: u32 = 1024 * 1024;

/// Maximum number of keys in a multi-key operation (100 keys).
pub const MAX_SETMULTI_KEYS: u32 = 100;

// ============================================================================
// Scan Limits
// ============================================================================

/// Maximum number of keys that can be returned in a single scan page.
pub const MAX_SCAN_RESULTS: u32 = 10_000;

/// Default number of keys returned in a scan if limit is not specified.
pub const DEFAULT_SCAN_LIMIT: u32 = 1_000;
