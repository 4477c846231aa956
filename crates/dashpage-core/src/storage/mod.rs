//! Key-value persistence for board layout and search preferences.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key holding the ordered list of user-created widgets.
pub const WIDGETS_KEY: &str = "board.widgets";

/// Key holding the last selected search provider.
pub const PROVIDER_KEY: &str = "search.provider";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A string key-value store, the same shape as a browser's local storage.
///
/// Every call completes synchronously: the board is driven from a single
/// event-processing thread and each mutation rewrites a whole value.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` means the key was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Read and decode a JSON value.
pub fn load_json<T, S>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

/// Encode and write a JSON value.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)
        .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))?;
    store.set(key, &raw)
}
