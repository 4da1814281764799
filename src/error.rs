//! Error types

use std::path::PathBuf;
use thiserror::Error;

use crate::billing::LimitDenialReason;

/// Failure reading or writing the key-value store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of the generative text service
#[derive(Debug, Error)]
pub enum AiError {
    #[error("No API key configured")]
    MissingApiKey,
    #[error("Invalid or expired API key: {0}")]
    InvalidApiKey(String),
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Empty response from the model")]
    EmptyResponse,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Model returned invalid JSON: {0}")]
    InvalidJson(String),
}

impl AiError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => {
                "Unable to initialise the AI. Configure your API key in Settings.".to_string()
            }
            Self::InvalidApiKey(_) => "Invalid or expired API key.".to_string(),
            Self::ModelNotFound(_) => {
                "Model not found. The model may have been updated.".to_string()
            }
            Self::QuotaExceeded(_) => "Quota exceeded. Wait or use another key.".to_string(),
            Self::Network(_) => "Network error. Check your internet connection.".to_string(),
            Self::EmptyResponse => "The AI returned an empty response.".to_string(),
            Self::Api { message, .. } => format!("AI error: {}", message),
            Self::InvalidJson(_) => "The AI returned an unreadable analysis.".to_string(),
        }
    }
}

/// Invalid configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("Could not determine a data directory; set VOICE_NOTES_DATA_DIR")]
    NoDataDir,
}

/// Failure of an application command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    LimitReached(LimitDenialReason),
    #[error("Transcript too short ({len} characters)")]
    TranscriptTooShort { len: usize },
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Chat session not found: {0}")]
    SessionNotFound(String),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Startup failure
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
