//! Request, response, and error types for the key-value store capability.
//!
//! The allocation engine never talks to a concrete store. It speaks these
//! types through the `ipam_traits::KeyValueStore` trait, and any backend
//! (an etcd-style cluster, a Raft log, the in-memory test store) translates
//! them into its own protocol.

mod read;
mod scan;
mod validation;
mod write;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub use read::DeleteRequest;
pub use read::DeleteResult;
pub use read::ReadRequest;
pub use read::ReadResult;
pub use scan::ScanRequest;
pub use scan::ScanResult;
pub use validation::validate_write_command;
pub use write::WriteCommand;
pub use write::WriteRequest;
pub use write::WriteResult;

/// A stored key and its value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyValueEntry {
    pub key: String,
    pub value: String,
}

/// Errors reported by a key-value store backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyValueStoreError {
    #[error("key '{key}' not found")]
    NotFound { key: String },

    #[error("compare-and-swap failed for key '{key}': expected {expected:?}, found {actual:?}")]
    CompareAndSwapFailed {
        key: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("not leader; current leader: {leader:?}; {reason}")]
    NotLeader { leader: Option<u64>, reason: String },

    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("key cannot be empty")]
    EmptyKey,

    #[error("key size {size} exceeds maximum of {max} bytes")]
    KeyTooLarge { size: u32, max: u32 },

    #[error("value size {size} exceeds maximum of {max} bytes")]
    ValueTooLarge { size: u32, max: u32 },

    #[error("batch size {size} exceeds maximum of {max} keys")]
    BatchTooLarge { size: u32, max: u32 },

    #[error("operation failed: {reason}")]
    Failed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_error_not_found_display() {
        let err = KeyValueStoreError::NotFound {
            key: "my-key".to_string(),
        };
        assert_eq!(err.to_string(), "key 'my-key' not found");
    }

    #[test]
    fn kv_error_compare_and_swap_failed_display() {
        let err = KeyValueStoreError::CompareAndSwapFailed {
            key: "/ipam/pool/net/allocated/10.0.1.2".to_string(),
            expected: None,
            actual: Some("1".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "compare-and-swap failed for key '/ipam/pool/net/allocated/10.0.1.2': expected None, found Some(\"1\")"
        );
    }

    #[test]
    fn kv_error_timeout_display() {
        let err = KeyValueStoreError::Timeout { duration_ms: 1000 };
        assert_eq!(err.to_string(), "operation timed out after 1000ms");
    }

    #[test]
    fn kv_error_not_leader_display() {
        let err = KeyValueStoreError::NotLeader {
            leader: Some(3),
            reason: "election in progress".to_string(),
        };
        assert_eq!(err.to_string(), "not leader; current leader: Some(3); election in progress");
    }

    #[test]
    fn kv_error_key_too_large_display() {
        let err = KeyValueStoreError::KeyTooLarge { size: 2048, max: 1024 };
        assert_eq!(err.to_string(), "key size 2048 exceeds maximum of 1024 bytes");
    }

    #[test]
    fn kv_error_equality_with_same_fields() {
        let err1 = KeyValueStoreError::NotFound { key: "same".into() };
        let err2 = KeyValueStoreError::NotFound { key: "same".into() };
        let err3 = KeyValueStoreError::NotFound {
            key: "different".into(),
        };

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
