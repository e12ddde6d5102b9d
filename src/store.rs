//! Per-request timeouts for store clients.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

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
use ipam_traits::KeyValueStore;
use tracing::warn;

/// Bounds every store call by a fixed deadline.
///
/// An expired call yields [`KeyValueStoreError::Timeout`]. The underlying
/// request is dropped, so a write may or may not have been applied.
pub struct TimeoutKeyValueStore<S: ?Sized> {
    inner: Arc<S>,
    timeout: Duration,
}

impl<S: KeyValueStore + ?Sized> TimeoutKeyValueStore<S> {
    pub fn new(inner: Arc<S>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, KeyValueStoreError>
    where F: Future<Output = Result<T, KeyValueStoreError>> + Send {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let duration_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(op, duration_ms, "store request timed out");
                Err(KeyValueStoreError::Timeout { duration_ms })
            }
        }
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for TimeoutKeyValueStore<S> {
    async fn write(&self, request: WriteRequest) -> Result<WriteResult, KeyValueStoreError> {
        self.bounded("write", self.inner.write(request)).await
    }

    async fn read(&self, request: ReadRequest) -> Result<ReadResult, KeyValueStoreError> {
        self.bounded("read", self.inner.read(request)).await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResult, KeyValueStoreError> {
        self.bounded("delete", self.inner.delete(request)).await
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanResult, KeyValueStoreError> {
        self.bounded("scan", self.inner.scan(request)).await
    }
}
