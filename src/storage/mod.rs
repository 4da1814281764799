//! Key-value persistence
//!
//! Every persisted record lives under one key and is rewritten in full on each
//! change. Three backends are provided:
//! - [`JsonFileStore`]: one JSON file per key in the data directory
//! - [`SqliteStore`]: a single SQLite table
//! - [`MemoryStore`]: process-local, for tests and throwaway sessions

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::StorageError;

pub const SUBSCRIPTION_KEY: &str = "voice_notes_subscription";
pub const USAGE_KEY: &str = "voice_notes_usage";
pub const NOTES_KEY: &str = "voice_notes_db";
pub const CHAT_HISTORY_KEY: &str = "voice_notes_chat_history";
pub const CURRENT_CHAT_KEY: &str = "voice_notes_current_chat";
pub const API_KEY_KEY: &str = "voice_notes_gemini_api_key";

/// String-valued key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared store handle
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Load a JSON record, falling back to `default` when it is absent,
/// unreadable or malformed
pub fn load_or_default<T, F>(store: &dyn KeyValueStore, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Malformed record, using defaults");
                default()
            }
        },
        Ok(None) => {
            debug!(key, "No record found, using defaults");
            default()
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read record, using defaults");
            default()
        }
    }
}

/// Serialize and write a whole record
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Write a record, logging instead of failing
///
/// In-memory state stays authoritative when the write fails.
pub fn persist_or_warn<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = save_json(store, key, value) {
        warn!(key, error = %e, "Failed to persist record");
    }
}

/// Keys become file names, so keep them to a safe alphabet
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        count: u32,
    }

    #[test]
    fn test_load_missing_uses_default() {
        let store = MemoryStore::new();
        let record: Record = load_or_default(&store, "missing", || Record { count: 7 });
        assert_eq!(record, Record { count: 7 });
    }

    #[test]
    fn test_load_malformed_uses_default() {
        let store = MemoryStore::new();
        store.set("record", "{not json").unwrap();
        let record: Record = load_or_default(&store, "record", || Record { count: 0 });
        assert_eq!(record.count, 0);

        // Negative counters do not fit the type either
        store.set("record", r#"{"count": -3}"#).unwrap();
        let record: Record = load_or_default(&store, "record", || Record { count: 0 });
        assert_eq!(record.count, 0);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save_json(&store, "record", &Record { count: 3 }).unwrap();
        let record: Record = load_or_default(&store, "record", || Record { count: 0 });
        assert_eq!(record.count, 3);
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key(USAGE_KEY).is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("").is_err());
    }
}
