//! Constants for the address-pool allocation engine.

// ============================================================================
// Key Layout
// ============================================================================

/// Namespace used when the configuration does not name one.
pub const DEFAULT_NAMESPACE: &str = "/ipam";

/// Path segment under the namespace that holds pool records.
pub const POOL_SEGMENT: &str = "pool";

/// Path segment under a pool that holds reservation markers.
pub const ALLOCATED_SEGMENT: &str = "allocated";

/// Value written for every reservation. Only key presence carries meaning.
pub const RESERVATION_MARKER: &str = "1";

/// Maximum length of the key namespace in bytes.
pub const MAX_NAMESPACE_LEN: u32 = 256;

/// Maximum length of a pool name in bytes.
///
/// Pool names become a single key segment, so they are bounded well below
/// `MAX_KEY_SIZE` to leave room for the namespace and the address suffix.
pub const MAX_POOL_NAME_LEN: u32 = 255;

/// Page size used when listing the reservations of one pool.
pub const RESERVATION_SCAN_PAGE: u32 = 1_000;

// ============================================================================
// Policy Option Keys
// ============================================================================

/// Request option carrying the network name a pool is created for.
pub const NETWORK_NAME_OPTION: &str = "network-name";

/// Pool option enabling unreserved gateway assignment when set to `"true"`.
pub const ALLOW_GATEWAY_ASSIGNMENT_OPTION: &str = "AllowGatewayIPAssignment";

/// Request option naming the kind of address being requested.
pub const REQUEST_ADDRESS_TYPE_OPTION: &str = "RequestAddressType";

/// `RequestAddressType` value marking a gateway request.
pub const GATEWAY_ADDRESS_TYPE: &str = "com.docker.network.gateway";

// ============================================================================
// Address Spaces
// ============================================================================

/// Default local address space reported to the orchestrator.
pub const LOCAL_ADDRESS_SPACE: &str = "Local";

/// Default global address space reported to the orchestrator.
pub const GLOBAL_ADDRESS_SPACE: &str = "Global";

// ============================================================================
// Store Client
// ============================================================================

/// Per-call store timeout in milliseconds (1 second).
///
/// Calls that exceed it fail fast as unavailable instead of hanging a request.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 1_000;

/// Upper bound accepted for a configured store timeout (5 minutes).
pub const MAX_STORE_TIMEOUT_MS: u64 = 300_000;
