//! Core logic for SimpleNotes, a single-note widget with debounced,
//! credential-store-backed persistence.

pub mod config;
pub mod db;
pub mod debounce;
pub mod logging;
pub mod model;
pub mod repo;
pub mod save;
pub mod session;
pub mod store;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use debounce::Debouncer;
pub use logging::{default_log_level, flush_logging, init_logging, logging_status, LoggingError};
pub use model::preferences::Preferences;
pub use repo::preferences_repo::{
    PreferencesRepository, PrefsError, PrefsResult, SqlitePreferencesRepository,
};
pub use save::{now_epoch_ms, SaveController, SaveOptions, SaveStatus, DEFAULT_SAVE_DELAY};
pub use session::{NoteSession, SessionError};
pub use store::{
    KeyringStore, MemoryStore, SecureStore, StoreError, StoreResult, DEFAULT_SERVICE, NOTES_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
