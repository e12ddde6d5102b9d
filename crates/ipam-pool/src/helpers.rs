//! Store access helpers shared by the registry and the allocator.

use ipam_constants::api::MAX_SETMULTI_KEYS;
use ipam_kv_types::DeleteRequest;
use ipam_kv_types::KeyValueStoreError;
use ipam_kv_types::ReadRequest;
use ipam_kv_types::ScanRequest;
use ipam_kv_types::WriteCommand;
use ipam_kv_types::WriteRequest;
use ipam_traits::KeyValueStore;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::error::IpamError;

/// Read and decode a JSON document. Absent keys yield `None`.
pub(crate) async fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, IpamError>
where
    T: for<'de> Deserialize<'de>,
    S: KeyValueStore + ?Sized,
{
    match store.read(ReadRequest::new(key.to_string())).await {
        Ok(result) => match result.kv {
            Some(kv) => serde_json::from_str(&kv.value).map(Some).map_err(|e| IpamError::CorruptPool {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(None),
        },
        Err(KeyValueStoreError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Encode `value` as JSON and write it unconditionally.
pub(crate) async fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), IpamError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.write(WriteRequest::set(key, json)).await?;
    Ok(())
}

/// List every key under `prefix`, following continuation tokens.
///
/// A `NotFound` from the store means the prefix has never been written and
/// yields an empty list.
pub(crate) async fn scan_all_keys<S>(store: &S, prefix: &str, page_size: u32) -> Result<Vec<String>, IpamError>
where S: KeyValueStore + ?Sized {
    let mut keys = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let request = ScanRequest::prefix(prefix, page_size).after(token.take());
        let page = match store.scan(request).await {
            Ok(page) => page,
            Err(KeyValueStoreError::NotFound { .. }) => break,
            Err(e) => return Err(e.into()),
        };

        keys.extend(page.entries.into_iter().map(|e| e.key));

        match (page.is_truncated, page.continuation_token) {
            (true, Some(next)) => token = Some(next),
            _ => break,
        }
    }

    Ok(keys)
}

/// Delete a single key. Returns whether it existed.
pub(crate) async fn delete_key<S>(store: &S, key: &str) -> Result<bool, IpamError>
where S: KeyValueStore + ?Sized {
    let result = store.delete(DeleteRequest::new(key.to_string())).await?;
    Ok(result.is_deleted)
}

/// Delete `keys` in bounded batches. Returns the number actually removed.
pub(crate) async fn delete_keys<S>(store: &S, keys: Vec<String>) -> Result<u32, IpamError>
where S: KeyValueStore + ?Sized {
    let mut removed = 0u32;
    for batch in keys.chunks(MAX_SETMULTI_KEYS as usize) {
        let result = store
            .write(WriteRequest {
                command: WriteCommand::DeleteMulti { keys: batch.to_vec() },
            })
            .await?;
        let batch_removed = result.keys_deleted.unwrap_or(batch.len() as u32);
        debug!(batch = batch.len(), removed = batch_removed, "deleted key batch");
        removed = removed.saturating_add(batch_removed);
    }
    Ok(removed)
}
