//! In-memory implementation of [`KeyValueStore`] for testing.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ipam_constants::api::DEFAULT_SCAN_LIMIT;
use ipam_constants::api::MAX_SCAN_RESULTS;
use ipam_kv_types::DeleteRequest;
use ipam_kv_types::DeleteResult;
use ipam_kv_types::KeyValueStoreError;
use ipam_kv_types::KeyValueEntry;
use ipam_kv_types::ReadRequest;
use ipam_kv_types::ReadResult;
use ipam_kv_types::ScanRequest;
use ipam_kv_types::ScanResult;
use ipam_kv_types::WriteCommand;
use ipam_kv_types::WriteRequest;
use ipam_kv_types::WriteResult;
use ipam_kv_types::validate_write_command;
use ipam_traits::KeyValueStore;
use tokio::sync::Mutex;

/// In-memory deterministic implementation of [`KeyValueStore`] for testing.
///
/// Every operation takes the same lock, so conditional writes are atomic and
/// linearizable exactly like the production contract requires.
///
/// # Limitations
///
/// - No persistence across restarts
/// - Single process only
#[derive(Clone, Default)]
pub struct DeterministicKeyValueStore {
    inner: Arc<Mutex<BTreeMap<String, String>>>,
}

impl DeterministicKeyValueStore {
    /// Create a new, empty in-memory key-value store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether `key` currently exists.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().await.contains_key(key)
    }

    /// All keys starting with `prefix`, sorted.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.inner
            .lock()
            .await
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Store a raw value, bypassing validation. Used to plant corrupt data.
    pub async fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.lock().await.insert(key.into(), value.into());
    }
}

#[async_trait]
impl KeyValueStore for DeterministicKeyValueStore {
    async fn write(&self, request: WriteRequest) -> Result<WriteResult, KeyValueStoreError> {
        validate_write_command(&request.command)?;

        let mut inner = self.inner.lock().await;
        match request.command {
            WriteCommand::Set { key, value } => {
                inner.insert(key.clone(), value.clone());
                Ok(WriteResult {
                    command: Some(WriteCommand::Set { key, value }),
                    ..Default::default()
                })
            }
            WriteCommand::DeleteMulti { keys } => {
                let mut removed = 0u32;
                for key in &keys {
                    if inner.remove(key).is_some() {
                        removed += 1;
                    }
                }
                Ok(WriteResult {
                    command: Some(WriteCommand::DeleteMulti { keys }),
                    keys_deleted: Some(removed),
                })
            }
            WriteCommand::CompareAndSwap {
                key,
                expected,
                new_value,
            } => {
                let current = inner.get(&key).cloned();
                let condition_matches = match (&expected, &current) {
                    (None, None) => true,
                    (Some(exp), Some(cur)) => exp == cur,
                    _ => false,
                };
                if condition_matches {
                    inner.insert(key.clone(), new_value.clone());
                    Ok(WriteResult {
                        command: Some(WriteCommand::CompareAndSwap {
                            key,
                            expected,
                            new_value,
                        }),
                        ..Default::default()
                    })
                } else {
                    Err(KeyValueStoreError::CompareAndSwapFailed {
                        key,
                        expected,
                        actual: current,
                    })
                }
            }
        }
    }

    async fn read(&self, request: ReadRequest) -> Result<ReadResult, KeyValueStoreError> {
        let guard = self.inner.lock().await;
        match guard.get(&request.key) {
            Some(value) => Ok(ReadResult {
                kv: Some(KeyValueEntry {
                    key: request.key,
                    value: value.clone(),
                }),
            }),
            None => Err(KeyValueStoreError::NotFound { key: request.key }),
        }
    }

    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResult, KeyValueStoreError> {
        let mut inner = self.inner.lock().await;
        let is_deleted = inner.remove(&request.key).is_some();
        Ok(DeleteResult {
            key: request.key,
            is_deleted,
        })
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanResult, KeyValueStoreError> {
        let inner = self.inner.lock().await;

        // Tiger Style bounded limit
        let limit = request.limit.unwrap_or(DEFAULT_SCAN_LIMIT).min(MAX_SCAN_RESULTS) as usize;

        // Continuation token format: base64(last_key)
        let start_after = request
            .continuation_token
            .as_ref()
            .and_then(|token| STANDARD.decode(token).ok())
            .and_then(|bytes| String::from_utf8(bytes).ok());

        let mut matching = inner
            .range(request.prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&request.prefix))
            .filter(|(k, _)| match &start_after {
                Some(after) => k.as_str() > after.as_str(),
                None => true,
            })
            .map(|(k, v)| KeyValueEntry {
                key: k.clone(),
                value: v.clone(),
            });

        let entries: Vec<KeyValueEntry> = matching.by_ref().take(limit).collect();
        let is_truncated = matching.next().is_some();

        let continuation_token = if is_truncated {
            entries.last().map(|e| STANDARD.encode(&e.key))
        } else {
            None
        };

        Ok(ScanResult {
            entries,
            is_truncated,
            continuation_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_missing_key_is_not_found() {
        let store = DeterministicKeyValueStore::new();
        let err = store.read(ReadRequest::new("missing")).await.unwrap_err();
        assert_eq!(err, KeyValueStoreError::NotFound { key: "missing".into() });
    }

    #[tokio::test]
    async fn set_then_read() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::set("a", "1")).await.unwrap();
        let result = store.read(ReadRequest::new("a")).await.unwrap();
        assert_eq!(result.kv.unwrap().value, "1");
    }

    #[tokio::test]
    async fn create_if_absent_fails_when_present() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::create_if_absent("a", "1")).await.unwrap();

        let err = store.write(WriteRequest::create_if_absent("a", "2")).await.unwrap_err();
        assert_eq!(err, KeyValueStoreError::CompareAndSwapFailed {
            key: "a".into(),
            expected: None,
            actual: Some("1".into()),
        });
        // Losing write must not clobber the winner
        assert_eq!(store.read(ReadRequest::new("a")).await.unwrap().kv.unwrap().value, "1");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::set("a", "1")).await.unwrap();

        let first = store.delete(DeleteRequest::new("a")).await.unwrap();
        let second = store.delete(DeleteRequest::new("a")).await.unwrap();
        assert!(first.is_deleted);
        assert!(!second.is_deleted);
    }

    #[tokio::test]
    async fn scan_empty_prefix_returns_no_entries() {
        let store = DeterministicKeyValueStore::new();
        let result = store.scan(ScanRequest::prefix("nothing/", 10)).await.unwrap();
        assert!(result.entries.is_empty());
        assert!(!result.is_truncated);
    }

    #[tokio::test]
    async fn scan_respects_prefix_boundary() {
        let store = DeterministicKeyValueStore::new();
        store.write(WriteRequest::set("pool/a/allocated/1", "1")).await.unwrap();
        store.write(WriteRequest::set("pool/ab/allocated/1", "1")).await.unwrap();

        let result = store.scan(ScanRequest::prefix("pool/a/", 10)).await.unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].key, "pool/a/allocated/1");
    }

    #[tokio::test]
    async fn scan_paginates_with_continuation_token() {
        let store = DeterministicKeyValueStore::new();
        for i in 0..25 {
            store.write(WriteRequest::set(format!("k/{i:03}"), "1")).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut token = None;
        loop {
            let page = store.scan(ScanRequest::prefix("k/", 10).after(token.clone())).await.unwrap();
            seen.extend(page.entries.into_iter().map(|e| e.key));
            if !page.is_truncated {
                break;
            }
            token = page.continuation_token;
        }

        assert_eq!(seen.len(), 25);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn exact_page_is_not_truncated() {
        let store = DeterministicKeyValueStore::new();
        for i in 0..10 {
            store.write(WriteRequest::set(format!("k/{i}"), "1")).await.unwrap();
        }
        let page = store.scan(ScanRequest::prefix("k/", 10)).await.unwrap();
        assert_eq!(page.entries.len(), 10);
        assert!(!page.is_truncated);
        assert!(page.continuation_token.is_none());
    }
}
