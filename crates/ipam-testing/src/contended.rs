//! [`KeyValueStore`] wrapper that loses conditional-create races on purpose.

use std::sync::Arc;

use async_trait::async_trait;
use ipam_kv_types::DeleteRequest;
use ipam_kv_types::DeleteResult;
use ipam_kv_types::KeyValueStoreError;
use ipam_kv_types::ReadRequest;
use ipam_kv_types::ReadResult;
use ipam_kv_types::ScanRequest;
use ipam_kv_types::ScanResult;
use ipam_kv_types::WriteCommand;
use ipam_kv_types::WriteRequest;
use ipam_kv_types::WriteResult;
use ipam_traits::KeyValueStore;
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct ContentionState {
    remaining: u32,
    stolen: Vec<String>,
}

/// Simulates a competing allocator that wins the race between a caller's
/// listing and its conditional create.
///
/// For the next `n` create-if-absent writes, the wrapper first creates the
/// key itself with the same value, then forwards the caller's write, which
/// fails with `CompareAndSwapFailed` exactly as it would against a real
/// cluster with a concurrent writer.
pub struct ContendedKeyValueStore<S: ?Sized> {
    inner: Arc<S>,
    state: Mutex<ContentionState>,
}

impl<S: KeyValueStore + ?Sized> ContendedKeyValueStore<S> {
    /// Wrap `inner` with no contention configured.
    pub fn new(inner: Arc<S>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            state: Mutex::new(ContentionState::default()),
        })
    }

    /// Steal the next `count` conditional creates.
    pub fn steal_next(&self, count: u32) {
        self.state.lock().remaining = count;
    }

    /// Keys claimed by the simulated competitor, in order.
    pub fn stolen_keys(&self) -> Vec<String> {
        self.state.lock().stolen.clone()
    }

    fn take_steal(&self, key: &str) -> bool {
        let mut state = self.state.lock();
        if state.remaining == 0 {
            return false;
        }
        state.remaining -= 1;
        state.stolen.push(key.to_string());
        true
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for ContendedKeyValueStore<S> {
    async fn write(&self, request: WriteRequest) -> Result<WriteResult, KeyValueStoreError> {
        if let WriteCommand::CompareAndSwap {
            key,
            expected: None,
            new_value,
        } = &request.command
            && self.take_steal(key)
        {
            debug!(key = %key, "competitor claims key first");
            // The competitor may itself lose if the key already exists
            let _ = self.inner.write(WriteRequest::create_if_absent(key.clone(), new_value.clone())).await;
        }
        self.inner.write(request).await
    }

    async fn read(&self, request: ReadRequest) -> Result<ReadResult, KeyValueStoreError> {
        self.inner.read(request).await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResult, KeyValueStoreError> {
        self.inner.delete(request).await
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanResult, KeyValueStoreError> {
        self.inner.scan(request).await
    }
}
