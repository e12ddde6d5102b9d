//! Fault-injecting [`KeyValueStore`] wrapper.

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
use parking_lot::Mutex;
use tracing::debug;

/// Which operations a configured fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTarget {
    All,
    Writes,
    Reads,
    Deletes,
    Scans,
}

impl FaultTarget {
    fn covers(self, op: FaultTarget) -> bool {
        self == FaultTarget::All || self == op
    }
}

#[derive(Debug)]
struct Fault {
    target: FaultTarget,
    error: KeyValueStoreError,
    /// Matching operations to let through before failing.
    skip: u32,
    /// Remaining failures; `None` fails until healed.
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
struct FaultState {
    fault: Option<Fault>,
    delay: Option<Duration>,
    operations: u64,
    injected: u64,
}

/// Wraps a store and injects errors or latency into selected operations.
///
/// Simulates an unreachable cluster, a leader election in progress, or a slow
/// network without a real backend.
pub struct FaultyKeyValueStore<S: ?Sized> {
    inner: Arc<S>,
    state: Mutex<FaultState>,
}

impl<S: KeyValueStore + ?Sized> FaultyKeyValueStore<S> {
    /// Wrap `inner` with no faults configured.
    pub fn new(inner: Arc<S>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            state: Mutex::new(FaultState::default()),
        })
    }

    /// Fail every matching operation with `error` until [`heal`](Self::heal).
    pub fn fail(&self, target: FaultTarget, error: KeyValueStoreError) {
        self.state.lock().fault = Some(Fault {
            target,
            error,
            skip: 0,
            remaining: None,
        });
    }

    /// Let `skip` matching operations through, then fail the rest with `error`.
    pub fn fail_after(&self, target: FaultTarget, skip: u32, error: KeyValueStoreError) {
        self.state.lock().fault = Some(Fault {
            target,
            error,
            skip,
            remaining: None,
        });
    }

    /// Fail the next `count` matching operations with `error`, then recover.
    pub fn fail_times(&self, target: FaultTarget, count: u32, error: KeyValueStoreError) {
        self.state.lock().fault = Some(Fault {
            target,
            error,
            skip: 0,
            remaining: Some(count),
        });
    }

    /// Delay every operation by `delay` before forwarding it.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().delay = delay;
    }

    /// Remove any configured fault and delay.
    pub fn heal(&self) {
        let mut state = self.state.lock();
        state.fault = None;
        state.delay = None;
    }

    /// Total operations seen, including failed ones.
    pub fn operations(&self) -> u64 {
        self.state.lock().operations
    }

    /// Number of injected failures so far.
    pub fn injected_failures(&self) -> u64 {
        self.state.lock().injected
    }

    async fn before(&self, op: FaultTarget) -> Result<(), KeyValueStoreError> {
        let (delay, outcome) = {
            let mut state = self.state.lock();
            state.operations += 1;
            let delay = state.delay;

            let mut outcome = Ok(());
            if let Some(fault) = state.fault.as_mut()
                && fault.target.covers(op)
            {
                if fault.skip > 0 {
                    fault.skip -= 1;
                } else {
                    match fault.remaining.as_mut() {
                        Some(0) => {}
                        Some(n) => {
                            *n -= 1;
                            outcome = Err(fault.error.clone());
                        }
                        None => outcome = Err(fault.error.clone()),
                    }
                }
            }
            if outcome.is_err() {
                state.injected += 1;
            }
            (delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Err(ref error) = outcome {
            debug!(?op, %error, "injected store fault");
        }
        outcome
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for FaultyKeyValueStore<S> {
    async fn write(&self, request: WriteRequest) -> Result<WriteResult, KeyValueStoreError> {
        self.before(FaultTarget::Writes).await?;
        self.inner.write(request).await
    }

    async fn read(&self, request: ReadRequest) -> Result<ReadResult, KeyValueStoreError> {
        self.before(FaultTarget::Reads).await?;
        self.inner.read(request).await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResult, KeyValueStoreError> {
        self.before(FaultTarget::Deletes).await?;
        self.inner.delete(request).await
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanResult, KeyValueStoreError> {
        self.before(FaultTarget::Scans).await?;
        self.inner.scan(request).await
    }
}
