//! Pluggable key-value persistence.
//!
//! Both stores persist through [`KeyValueStore`] only, reading and writing
//! whole JSON blobs by string key. [`LmdbStorage`](crate::local_storage::LmdbStorage)
//! is the on-disk backend. [`MemoryStorage`] keeps everything in a map and
//! is what the tests (and hosts that do not care about persistence) use.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StorageError;

/// Key under which the signed-in user is persisted.
pub const SESSION_KEY: &str = "anugya_patra.session";

const DOCUMENTS_KEY_PREFIX: &str = "anugya_patra.documents.";

/// Key holding the document collection of `user_id`.
pub fn documents_key(user_id: &str) -> String {
    format!("{DOCUMENTS_KEY_PREFIX}{user_id}")
}

const QUARANTINE_KEY_PREFIX: &str = "anugya_patra.quarantine.";

/// Key holding records set aside while loading `user_id`'s collection:
/// entries that no longer deserialize, or the raw blob when the collection
/// is not a JSON array at all. Never read back by the stores.
pub fn quarantine_key(user_id: &str) -> String {
    format!("{QUARANTINE_KEY_PREFIX}{user_id}")
}

/// String-keyed persistence used by the session and document stores.
///
/// Implementations must treat each call as atomic on its own. Removing a
/// key that does not exist is not an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Pushes buffered writes to durable media. No-op by default.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Volatile [`KeyValueStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
