//! Application state shared by all commands

use std::sync::{Arc, Mutex};
use tracing::info;

use crate::ai::{GeminiClient, TextGenerator};
use crate::billing::{EntitlementPolicy, Entitlements};
use crate::clock::{SharedClock, SystemClock};
use crate::config::{AppConfig, StorageBackend};
use crate::error::StorageError;
use crate::notes::{ChatSessions, NotesStore};
use crate::storage::{JsonFileStore, SharedStore, SqliteStore};

pub struct AppState {
    pub entitlements: Mutex<Entitlements>,
    pub notes: Mutex<NotesStore>,
    pub chats: Mutex<ChatSessions>,
    pub generator: Arc<dyn TextGenerator>,
    pub clock: SharedClock,
    pub store: SharedStore,
}

impl AppState {
    /// Open the configured store and wire the Gemini client
    pub fn new(config: &AppConfig) -> Result<Self, StorageError> {
        let store = open_store(config)?;
        let generator = Arc::new(GeminiClient::new(config.ai.clone(), store.clone()));
        let policy = EntitlementPolicy {
            enforce_expiry: config.enforce_expiry,
        };
        Ok(Self::with_parts(
            store,
            Arc::new(SystemClock),
            generator,
            policy,
        ))
    }

    pub fn with_parts(
        store: SharedStore,
        clock: SharedClock,
        generator: Arc<dyn TextGenerator>,
        policy: EntitlementPolicy,
    ) -> Self {
        Self {
            entitlements: Mutex::new(Entitlements::load(store.clone(), clock.clone(), policy)),
            notes: Mutex::new(NotesStore::load(store.clone())),
            chats: Mutex::new(ChatSessions::load(store.clone(), clock.clone())),
            generator,
            clock,
            store,
        }
    }
}

/// Open the key-value store selected in the config
pub fn open_store(config: &AppConfig) -> Result<SharedStore, StorageError> {
    let store: SharedStore = match config.storage {
        StorageBackend::Json => Arc::new(JsonFileStore::open(config.data_dir.clone())?),
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(&config.sqlite_path())?),
    };
    info!(
        backend = ?config.storage,
        dir = %config.data_dir.display(),
        "Opened storage"
    );
    Ok(store)
}
