//! Storage key helpers shared by every backend.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that would escape the storage root.
pub(crate) fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Text after the first base that occurs in `url`, without leading slashes.
///
/// Bases are tried in order and empty bases are skipped. A URL that contains
/// none of them does not belong to this store.
pub(crate) fn key_for_url(url: &str, bases: &[&str]) -> StorageResult<String> {
    let found = bases
        .iter()
        .map(|base| base.trim_end_matches('/'))
        .filter(|base| !base.is_empty())
        .find_map(|base| url.find(base).map(|start| &url[start + base.len()..]));

    let Some(rest) = found else {
        return Err(StorageError::InvalidKey(format!(
            "URL {} is not under this storage's base URL",
            url
        )));
    };

    let key = rest.trim_start_matches('/').to_string();
    validate_key(&key)?;
    Ok(key)
}
