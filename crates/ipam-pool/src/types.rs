//! Pool and request types.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use ipam_constants::pool::ALLOW_GATEWAY_ASSIGNMENT_OPTION;
use ipnet::Ipv4Net;
use serde::Deserialize;
use serde::Serialize;

/// Free-form pool policy options.
pub type PoolOptions = BTreeMap<String, String>;

/// A named IPv4 range from which addresses are allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Unique name within the namespace.
    pub id: String,
    /// Network address and prefix length. Host bits are always zero.
    pub network: Ipv4Net,
    /// Policy options recorded at creation.
    #[serde(default)]
    pub options: PoolOptions,
}

impl Pool {
    /// Create a pool, clearing any host bits in `network`.
    pub fn new(id: impl Into<String>, network: Ipv4Net, options: PoolOptions) -> Self {
        Self {
            id: id.into(),
            network: network.trunc(),
            options,
        }
    }

    /// Prefix length of the pool network.
    pub fn prefix_len(&self) -> u8 {
        self.network.prefix_len()
    }

    /// Whether `address` lies inside the pool network.
    pub fn contains(&self, address: Ipv4Addr) -> bool {
        self.network.contains(&address)
    }

    /// Whether gateway requests may bypass reservation.
    pub fn allows_gateway_assignment(&self) -> bool {
        self.options.get(ALLOW_GATEWAY_ASSIGNMENT_OPTION).is_some_and(|v| v == "true")
    }
}

/// What kind of address the caller is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressKind {
    /// An ordinary endpoint address.
    #[default]
    Endpoint,
    /// The network's gateway address.
    Gateway,
}

/// A request for one address from a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressRequest {
    /// Specific address wanted, or `None` for any free address.
    pub address: Option<Ipv4Addr>,
    /// Gateway requests may skip the reservation when the pool allows it.
    pub kind: AddressKind,
}

impl AddressRequest {
    /// Any free address.
    pub fn any() -> Self {
        Self::default()
    }

    /// A specific endpoint address.
    pub fn fixed(address: Ipv4Addr) -> Self {
        Self {
            address: Some(address),
            kind: AddressKind::Endpoint,
        }
    }

    /// A gateway address, optionally fixed.
    pub fn gateway(address: Option<Ipv4Addr>) -> Self {
        Self {
            address,
            kind: AddressKind::Gateway,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_new_normalizes_network() {
        let pool = Pool::new("net1", "10.0.1.7/24".parse().unwrap(), PoolOptions::new());
        assert_eq!(pool.network.to_string(), "10.0.1.0/24");
    }

    #[test]
    fn test_allows_gateway_assignment_requires_exact_true() {
        let mut options = PoolOptions::new();
        let net = "10.0.1.0/24".parse().unwrap();
        assert!(!Pool::new("p", net, options.clone()).allows_gateway_assignment());

        options.insert(ALLOW_GATEWAY_ASSIGNMENT_OPTION.to_string(), "TRUE".to_string());
        assert!(!Pool::new("p", net, options.clone()).allows_gateway_assignment());

        options.insert(ALLOW_GATEWAY_ASSIGNMENT_OPTION.to_string(), "true".to_string());
        assert!(Pool::new("p", net, options).allows_gateway_assignment());
    }

    #[test]
    fn test_pool_json_shape() {
        let pool = Pool::new("net1", "10.0.1.0/24".parse().unwrap(), PoolOptions::new());
        let json = serde_json::to_string(&pool).unwrap();
        assert_eq!(json, r#"{"id":"net1","network":"10.0.1.0/24","options":{}}"#);
        let back: Pool = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pool);
    }
}
