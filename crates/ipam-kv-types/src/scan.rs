//! Prefix scan types.

use serde::Deserialize;
use serde::Serialize;

use crate::KeyValueEntry;

/// Request to list keys sharing a prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanRequest {
    pub prefix: String,
    pub limit: Option<u32>,
    pub continuation_token: Option<String>,
}

impl ScanRequest {
    /// Scan the first page under `prefix`.
    pub fn prefix(prefix: impl Into<String>, limit: u32) -> Self {
        Self {
            prefix: prefix.into(),
            limit: Some(limit),
            continuation_token: None,
        }
    }

    /// Continue a previous scan from `token`.
    pub fn after(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }
}

/// Response from a scan operation, sorted by key.
///
/// A prefix with no keys yields an empty `entries` list, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanResult {
    pub entries: Vec<KeyValueEntry>,
    pub is_truncated: bool,
    pub continuation_token: Option<String>,
}
