//! Application configuration.
//!
//! # Responsibility
//! - Describe where preferences and logs live, which secure store backs the
//!   note, and how long the save debounce waits.
//! - Load optional JSON configuration files with every field defaulted.
//!
//! # Invariants
//! - `debounce_ms` is never zero after `validate`.
//! - Relative directories are rejected; log setup requires absolute paths.

use crate::db::PREFERENCES_DB_FILE_NAME;
use crate::logging::default_log_level;
use crate::save::SaveOptions;
use crate::store::{KeyringStore, MemoryStore, SecureStore, DEFAULT_SERVICE, NOTES_KEY};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const APP_DIR_NAME: &str = "SimpleNotes";
const LOG_DIR_NAME: &str = "logs";
const DEFAULT_DEBOUNCE_MS: u64 = 3_000;

/// Secure store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Platform credential store.
    #[default]
    Keyring,
    /// Process-local store; nothing survives exit.
    Memory,
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// No platform data directory and none configured.
    NoDataDir,
    RelativePath(PathBuf),
    ZeroDebounce,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::NoDataDir => write!(f, "no data directory configured or detected"),
            Self::RelativePath(path) => {
                write!(f, "path must be absolute, got `{}`", path.display())
            }
            Self::ZeroDebounce => write!(f, "debounce_ms must be greater than zero"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Top-level configuration for one SimpleNotes process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the preferences database. Defaults to the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,
    /// Directory for rolling log files. Defaults to `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
    /// `trace|debug|info|warn|error`; defaults by build mode.
    pub log_level: Option<String>,
    pub store: StoreBackend,
    /// Credential-store namespace for the keyring backend.
    pub keyring_service: String,
    pub notes_key: String,
    pub debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_dir: None,
            log_level: None,
            store: StoreBackend::default(),
            keyring_service: DEFAULT_SERVICE.to_string(),
            notes_key: NOTES_KEY.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        for path in [self.data_dir.as_ref(), self.log_dir.as_ref()]
            .into_iter()
            .flatten()
        {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath(path.clone()));
            }
        }
        Ok(())
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|base| base.join(APP_DIR_NAME))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    pub fn log_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.data_dir()?.join(LOG_DIR_NAME)),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn preferences_db_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(PREFERENCES_DB_FILE_NAME))
    }

    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            key: self.notes_key.clone(),
            delay: Duration::from_millis(self.debounce_ms),
        }
    }

    /// Builds the configured secure store backend.
    pub fn build_store(&self) -> Arc<dyn SecureStore> {
        match self.store {
            StoreBackend::Keyring => Arc::new(KeyringStore::new(self.keyring_service.clone())),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        }
    }
}
