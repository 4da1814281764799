//! Runtime configuration
//!
//! Read from the environment after `.env` has been loaded. Data lives in the
//! platform data directory unless overridden:
//! - Linux: `~/.local/share/voice-notes/`
//! - macOS: `~/Library/Application Support/voice-notes/`
//! - Windows: `%APPDATA%\voice-notes\`

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_LOG_FILTER: &str = "warn,voice_notes_lib=info";

const APP_DIR_NAME: &str = "voice-notes";
const SQLITE_FILE_NAME: &str = "voice_notes.db";

/// Where persisted records are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// One JSON file per record
    #[default]
    Json,
    /// Single SQLite database
    Sqlite,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Settings for the generative text service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    pub base_url: String,
    pub model: String,
    /// Used when no key has been saved in Settings
    pub fallback_key: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            fallback_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    pub ai: AiSettings,
    /// Treat premium records past their end date as free
    pub enforce_expiry: bool,
    pub log_filter: String,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match non_empty("VOICE_NOTES_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let storage = match non_empty("VOICE_NOTES_STORAGE") {
            Some(value) => {
                StorageBackend::parse(&value).ok_or(ConfigError::InvalidValue {
                    key: "VOICE_NOTES_STORAGE",
                    value,
                    reason: "expected json or sqlite",
                })?
            }
            None => StorageBackend::default(),
        };

        let enforce_expiry = match non_empty("VOICE_NOTES_ENFORCE_EXPIRY") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: "VOICE_NOTES_ENFORCE_EXPIRY",
                value,
                reason: "expected true or false",
            })?,
            None => false,
        };

        let ai = AiSettings {
            base_url: non_empty("VOICE_NOTES_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: non_empty("VOICE_NOTES_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            fallback_key: non_empty("GEMINI_API_KEY").map(|k| k.trim().to_string()),
        };

        Ok(Self {
            data_dir,
            storage,
            ai,
            enforce_expiry,
            log_filter: non_empty("VOICE_NOTES_LOG")
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_FILE_NAME)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("VOICE_NOTES_DATA_DIR", "/tmp/vn")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/vn"));
        assert_eq!(config.storage, StorageBackend::Json);
        assert_eq!(config.ai, AiSettings::default());
        assert!(!config.enforce_expiry);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.sqlite_path(), PathBuf::from("/tmp/vn/voice_notes.db"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("VOICE_NOTES_DATA_DIR", "/data"),
            ("VOICE_NOTES_STORAGE", "SQLite"),
            ("VOICE_NOTES_ENFORCE_EXPIRY", "yes"),
            ("VOICE_NOTES_MODEL", "gemini-pro"),
            ("GEMINI_API_KEY", " abc "),
            ("VOICE_NOTES_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert!(config.enforce_expiry);
        assert_eq!(config.ai.model, "gemini-pro");
        assert_eq!(config.ai.fallback_key.as_deref(), Some("abc"));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[
            ("VOICE_NOTES_DATA_DIR", "/data"),
            ("GEMINI_API_KEY", "   "),
            ("VOICE_NOTES_STORAGE", ""),
        ])
        .unwrap();
        assert_eq!(config.ai.fallback_key, None);
        assert_eq!(config.storage, StorageBackend::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("VOICE_NOTES_DATA_DIR", "/d"), ("VOICE_NOTES_STORAGE", "redis")]),
            Err(ConfigError::InvalidValue {
                key: "VOICE_NOTES_STORAGE",
                ..
            })
        ));
        assert!(matches!(
            config_from(&[
                ("VOICE_NOTES_DATA_DIR", "/d"),
                ("VOICE_NOTES_ENFORCE_EXPIRY", "sometimes")
            ]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
