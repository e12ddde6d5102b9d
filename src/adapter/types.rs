//! Request and response bodies of the IPAM plugin protocol.
//!
//! Field names follow the protocol's JSON exactly (`PoolID`, `V6`,
//! `RequiresMACAddress`), so a transport can (de)serialize these directly.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

pub type Options = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestPoolRequest {
    #[serde(default)]
    pub address_space: String,
    #[serde(default)]
    pub pool: String,
    #[serde(default)]
    pub sub_pool: String,
    #[serde(default)]
    pub options: Options,
    #[serde(rename = "V6", default)]
    pub v6: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestPoolResponse {
    #[serde(rename = "PoolID")]
    pub pool_id: String,
    pub pool: String,
    pub data: Options,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePoolRequest {
    #[serde(rename = "PoolID")]
    pub pool_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestAddressRequest {
    #[serde(rename = "PoolID")]
    pub pool_id: String,
    /// Empty for "any free address".
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestAddressResponse {
    /// `a.b.c.d/len`
    pub address: String,
    pub data: Options,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReleaseAddressRequest {
    #[serde(rename = "PoolID")]
    pub pool_id: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    #[serde(rename = "RequiresMACAddress")]
    pub requires_mac_address: bool,
    #[serde(rename = "RequiresRequestReplay")]
    pub requires_request_replay: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressSpacesResponse {
    pub local_default_address_space: String,
    pub global_default_address_space: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_pool_wire_names() {
        let json = r#"{"AddressSpace":"Local","Pool":"10.0.1.0/24","Options":{"network-name":"net1"},"V6":false}"#;
        let req: RequestPoolRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.pool, "10.0.1.0/24");
        assert_eq!(req.options.get("network-name").map(String::as_str), Some("net1"));
        assert!(req.sub_pool.is_empty());
    }

    #[test]
    fn test_response_wire_names() {
        let resp = RequestPoolResponse {
            pool_id: "net1".into(),
            pool: "10.0.1.0/24".into(),
            data: Options::new(),
        };
        assert_eq!(serde_json::to_string(&resp).unwrap(), r#"{"PoolID":"net1","Pool":"10.0.1.0/24","Data":{}}"#);

        let caps = CapabilitiesResponse {
            requires_mac_address: true,
            requires_request_replay: false,
        };
        assert_eq!(
            serde_json::to_string(&caps).unwrap(),
            r#"{"RequiresMACAddress":true,"RequiresRequestReplay":false}"#
        );
    }
}
