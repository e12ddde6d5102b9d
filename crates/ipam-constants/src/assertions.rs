//! Compile-time constant assertions.
//!
//! These assertions catch configuration errors at compile time rather than runtime.
//! Each assertion verifies a relationship between constants that must hold for
//! correct system operation.

use super::api::*;
use super::pool::*;

// ============================================================================
// Size Limits
// ============================================================================

const _: () = assert!(MAX_KEY_SIZE > 0);
const _: () = assert!(MAX_VALUE_SIZE > MAX_KEY_SIZE);
const _: () = assert!(MAX_SETMULTI_KEYS > 0);

// Namespace, pool name, fixed segments and the longest dotted quad must fit in one key.
const _: () = assert!(MAX_NAMESPACE_LEN + MAX_POOL_NAME_LEN + 64 < MAX_KEY_SIZE);

// ============================================================================
// Scan Limits
// ============================================================================

const _: () = assert!(DEFAULT_SCAN_LIMIT > 0);
const _: () = assert!(DEFAULT_SCAN_LIMIT <= MAX_SCAN_RESULTS);
const _: () = assert!(RESERVATION_SCAN_PAGE > 0);
const _: () = assert!(RESERVATION_SCAN_PAGE <= MAX_SCAN_RESULTS);

// ============================================================================
// Store Client
// ============================================================================

const _: () = assert!(DEFAULT_STORE_TIMEOUT_MS > 0);
const _: () = assert!(DEFAULT_STORE_TIMEOUT_MS <= MAX_STORE_TIMEOUT_MS);
