//! Key layout for pool records and reservations.
//!
//! ```text
//! {namespace}/pool/{pool_id}                      pool record (JSON)
//! {namespace}/pool/{pool_id}/allocated/{address}  reservation marker
//! ```
//!
//! The reservation prefix always ends in `/`, so pool `a` never lists the
//! reservations of pool `ab`.

use std::net::Ipv4Addr;

use ipam_constants::pool::ALLOCATED_SEGMENT;
use ipam_constants::pool::MAX_POOL_NAME_LEN;
use ipam_constants::pool::POOL_SEGMENT;

#[inline]
fn trim_namespace(namespace: &str) -> &str {
    namespace.trim_end_matches('/')
}

/// Key of the pool record.
///
/// # Example
///
/// ```ignore
/// assert_eq!(pool_key("/ipam", "net1"), "/ipam/pool/net1");
/// ```
#[inline]
pub fn pool_key(namespace: &str, pool_id: &str) -> String {
    format!("{}/{}/{}", trim_namespace(namespace), POOL_SEGMENT, pool_id)
}

/// Prefix shared by every reservation in a pool, including the trailing `/`.
#[inline]
pub fn reservations_prefix(namespace: &str, pool_id: &str) -> String {
    format!("{}/{}/", pool_key(namespace, pool_id), ALLOCATED_SEGMENT)
}

/// Key of the reservation marker for `address` in `pool_id`.
#[inline]
pub fn reservation_key(namespace: &str, pool_id: &str, address: Ipv4Addr) -> String {
    format!("{}{}", reservations_prefix(namespace, pool_id), address)
}

/// Recover the address from a listed reservation key.
///
/// Returns `None` if the key is outside `prefix` or its suffix is not a
/// dotted-quad address.
#[inline]
pub fn parse_reservation_key(prefix: &str, key: &str) -> Option<Ipv4Addr> {
    key.strip_prefix(prefix)?.parse().ok()
}

/// Check that a pool name fits in a single key segment.
pub fn check_pool_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("pool name cannot be empty".to_string());
    }
    if name.contains('/') {
        return Err(format!("pool name '{name}' must not contain '/'"));
    }
    if name.len() > MAX_POOL_NAME_LEN as usize {
        return Err(format!("pool name is {} bytes, maximum is {}", name.len(), MAX_POOL_NAME_LEN));
    }
    Ok(())
}
