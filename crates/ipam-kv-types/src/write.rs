//! Write operation types for modifying key-value state.

use serde::Deserialize;
use serde::Serialize;

/// Commands for modifying key-value state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WriteCommand {
    /// Set a single key-value pair unconditionally.
    Set { key: String, value: String },
    /// Delete multiple keys atomically.
    DeleteMulti { keys: Vec<String> },
    /// Compare-and-swap: atomically write if the current value matches expected.
    ///
    /// `expected: None` means the key must not exist.
    CompareAndSwap {
        key: String,
        expected: Option<String>,
        new_value: String,
    },
}

/// Request to perform a write operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteRequest {
    pub command: WriteCommand,
}

impl WriteRequest {
    /// Create a Set command to store a key-value pair.
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            command: WriteCommand::Set {
                key: key.into(),
                value: value.into(),
            },
        }
    }

    /// Create a CompareAndSwap command.
    pub fn compare_and_swap(key: impl Into<String>, expected: Option<String>, new_value: impl Into<String>) -> Self {
        Self {
            command: WriteCommand::CompareAndSwap {
                key: key.into(),
                expected,
                new_value: new_value.into(),
            },
        }
    }

    /// Create a write that only succeeds when `key` does not exist yet.
    pub fn create_if_absent(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare_and_swap(key, None, value)
    }
}

/// Result of a write operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WriteResult {
    pub command: Option<WriteCommand>,
    pub keys_deleted: Option<u32>,
}
