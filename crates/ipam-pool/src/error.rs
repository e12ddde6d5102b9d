//! Error types for the allocation engine.

use ipam_kv_types::KeyValueStoreError;
use snafu::Snafu;

/// Errors from pool and address operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IpamError {
    /// Malformed or incomplete request.
    #[snafu(display("{reason}"))]
    InvalidRequest {
        /// Caller-facing description of what is wrong.
        reason: String,
    },

    /// No pool record exists under this name.
    #[snafu(display("pool '{pool_id}' not found"))]
    PoolNotFound {
        /// The requested pool.
        pool_id: String,
    },

    /// A pool record exists but cannot be decoded.
    #[snafu(display("corrupt pool record in key '{key}': {reason}"))]
    CorruptPool {
        /// The key holding the bad record.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// The address is already reserved in this pool.
    #[snafu(display("address {address} already in use in pool '{pool_id}'"))]
    AddressInUse {
        /// Pool the reservation was attempted in.
        pool_id: String,
        /// The contested address.
        address: String,
    },

    /// Every usable address of the pool is reserved.
    #[snafu(display("pool '{pool_id}' ({network}) has no free addresses"))]
    PoolExhausted {
        /// The exhausted pool.
        pool_id: String,
        /// The pool's CIDR.
        network: String,
    },

    /// The store is unreachable, timed out, or has no leader.
    #[snafu(display("store unavailable: {source}"))]
    StoreUnavailable {
        /// The underlying error.
        source: KeyValueStoreError,
    },

    /// Any other store failure.
    #[snafu(display("storage error: {source}"))]
    Storage {
        /// The underlying error.
        source: KeyValueStoreError,
    },

    /// JSON encoding of a pool record failed.
    #[snafu(display("serialization error: {source}"))]
    Serialization {
        /// The underlying error.
        source: serde_json::Error,
    },
}

impl IpamError {
    /// Build an `InvalidRequest` error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        IpamError::InvalidRequest { reason: reason.into() }
    }
}

/// Coarse classification of store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorClass {
    /// The key or prefix does not exist.
    NotFound,
    /// A conditional create found the key already present.
    AlreadyExists,
    /// Transport, timeout, or leadership failure. Retrying later may succeed.
    Unavailable,
    /// Anything else.
    Other,
}

/// Classify a store error. Callers decide what each class means in context.
pub fn classify_store_error(error: &KeyValueStoreError) -> StoreErrorClass {
    match error {
        KeyValueStoreError::NotFound { .. } => StoreErrorClass::NotFound,
        KeyValueStoreError::CompareAndSwapFailed { .. } => StoreErrorClass::AlreadyExists,
        KeyValueStoreError::Timeout { .. }
        | KeyValueStoreError::NotLeader { .. }
        | KeyValueStoreError::Unavailable { .. } => StoreErrorClass::Unavailable,
        KeyValueStoreError::EmptyKey
        | KeyValueStoreError::KeyTooLarge { .. }
        | KeyValueStoreError::ValueTooLarge { .. }
        | KeyValueStoreError::BatchTooLarge { .. }
        | KeyValueStoreError::Failed { .. } => StoreErrorClass::Other,
    }
}

impl From<KeyValueStoreError> for IpamError {
    fn from(source: KeyValueStoreError) -> Self {
        match classify_store_error(&source) {
            StoreErrorClass::Unavailable => IpamError::StoreUnavailable { source },
            _ => IpamError::Storage { source },
        }
    }
}

impl From<serde_json::Error> for IpamError {
    fn from(source: serde_json::Error) -> Self {
        IpamError::Serialization { source }
    }
}
