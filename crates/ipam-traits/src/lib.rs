//! The key-value store capability the allocation engine depends on.
//!
//! The engine holds no authoritative state of its own; every decision is made
//! against a [`KeyValueStore`] injected at construction time.

use async_trait::async_trait;
use ipam_kv_types::DeleteRequest;
use ipam_kv_types::DeleteResult;
use ipam_kv_types::KeyValueStoreError;
use ipam_kv_types::ReadRequest;
use ipam_kv_types::ReadResult;
use ipam_kv_types::ScanRequest;
use ipam_kv_types::ScanResult;
use ipam_kv_types::WriteRequest;
use ipam_kv_types::WriteResult;

/// Strongly consistent key-value store interface.
///
/// Implementations must make `WriteCommand::CompareAndSwap` atomic: of two
/// concurrent conditional writes to the same key, exactly one succeeds and the
/// other fails with [`KeyValueStoreError::CompareAndSwapFailed`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Apply a write command.
    async fn write(&self, request: WriteRequest) -> Result<WriteResult, KeyValueStoreError>;

    /// Read a value by key. Absent keys fail with [`KeyValueStoreError::NotFound`].
    async fn read(&self, request: ReadRequest) -> Result<ReadResult, KeyValueStoreError>;

    /// Delete a key. Deleting an absent key succeeds with `is_deleted = false`.
    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResult, KeyValueStoreError>;

    /// Scan keys matching a prefix with pagination support.
    async fn scan(&self, request: ScanRequest) -> Result<ScanResult, KeyValueStoreError>;
}

// Blanket implementation for Arc<T>
#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn write(&self, request: WriteRequest) -> Result<WriteResult, KeyValueStoreError> {
        (**self).write(request).await
    }

    async fn read(&self, request: ReadRequest) -> Result<ReadResult, KeyValueStoreError> {
        (**self).read(request).await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResult, KeyValueStoreError> {
        (**self).delete(request).await
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanResult, KeyValueStoreError> {
        (**self).scan(request).await
    }
}
