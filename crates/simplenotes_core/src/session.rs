//! Note session: the application context the UI talks to.
//!
//! # Responsibility
//! - Own the note text, the user preferences and the save controller.
//! - Load preferences and the stored note at startup; flush and persist them
//!   at shutdown.
//!
//! # Invariants
//! - Every text mutation is forwarded to the save controller; assigning the
//!   current value again is not a mutation.
//! - Opening a session never writes to the secure store.
//! - Preferences are read once in `open` and written once in `close`.

use crate::config::{AppConfig, ConfigError};
use crate::db::{open_db, DbError};
use crate::model::preferences::Preferences;
use crate::repo::preferences_repo::{
    PreferencesRepository, PrefsError, SqlitePreferencesRepository,
};
use crate::save::{SaveController, SaveOptions, SaveStatus};
use crate::store::{SecureStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Session lifecycle error.
#[derive(Debug)]
pub enum SessionError {
    Config(ConfigError),
    Db(DbError),
    Prefs(PrefsError),
    /// Pending note could not be written during `close`. Preferences were
    /// still persisted.
    Flush(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Prefs(err) => write!(f, "{err}"),
            Self::Flush(err) => write!(f, "pending note was not saved: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Prefs(err) => Some(err),
            Self::Flush(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for SessionError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<PrefsError> for SessionError {
    fn from(value: PrefsError) -> Self {
        Self::Prefs(value)
    }
}

/// Single-note editing session.
pub struct NoteSession<R: PreferencesRepository> {
    text: String,
    prefs: Preferences,
    controller: SaveController,
    repo: R,
}

impl NoteSession<SqlitePreferencesRepository> {
    /// Opens a session using the configured store and preferences database.
    pub fn open_with_config(config: &AppConfig, runtime: Handle) -> Result<Self, SessionError> {
        config.validate()?;
        let conn = open_db(config.preferences_db_path()?)?;
        let repo = SqlitePreferencesRepository::try_new(conn)?;
        Self::open(config.build_store(), repo, config.save_options(), runtime)
    }
}

impl<R: PreferencesRepository> NoteSession<R> {
    /// Loads preferences, then seeds the text from the secure store.
    ///
    /// Unparseable preference values fall back to defaults; storage
    /// failures are returned.
    pub fn open(
        store: Arc<dyn SecureStore>,
        repo: R,
        options: SaveOptions,
        runtime: Handle,
    ) -> Result<Self, SessionError> {
        let prefs = match repo.load() {
            Ok(prefs) => prefs,
            Err(err @ PrefsError::InvalidData { .. }) => {
                warn!(
                    "event=prefs_load module=session status=error error_code=prefs_invalid error={}",
                    err
                );
                Preferences::default()
            }
            Err(err) => return Err(err.into()),
        };

        let controller = SaveController::new(store, options, runtime, prefs.last_saved);
        let text = controller.load_initial();
        info!(
            "event=session_open module=session status=ok text_len={} font_size={}",
            text.len(),
            prefs.font_size
        );

        Ok(Self {
            text,
            prefs,
            controller,
            repo,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the note text. Returns `false` when the text is unchanged.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        self.controller.on_text_changed(self.text.clone());
        true
    }

    /// Appends one line of input followed by a newline.
    pub fn append_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
        self.controller.on_text_changed(self.text.clone());
    }

    /// Clears the note; the empty text is saved like any other edit.
    pub fn clear(&mut self) -> bool {
        self.set_text(String::new())
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn font_size(&self) -> f64 {
        self.prefs.font_size
    }

    pub fn increase_font_size(&mut self) -> f64 {
        self.prefs.increase_font_size()
    }

    pub fn decrease_font_size(&mut self) -> f64 {
        self.prefs.decrease_font_size()
    }

    pub fn reset_font_size(&mut self) -> f64 {
        self.prefs.reset_font_size()
    }

    pub fn is_save_pending(&self) -> bool {
        self.controller.is_pending()
    }

    /// Returns whether some edit is not persisted yet (pending or failed).
    pub fn has_unsaved_changes(&self) -> bool {
        self.controller.has_unsaved_changes()
    }

    pub fn last_saved(&self) -> Option<i64> {
        self.controller.last_saved()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.controller.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.controller.subscribe()
    }

    /// Writes any unsaved edit (pending or previously failed) and persists
    /// preferences.
    ///
    /// Preferences are written even when the flush fails; the flush failure
    /// is returned afterwards.
    pub fn close(mut self) -> Result<Preferences, SessionError> {
        let flushed = self.controller.flush(&self.text);
        self.prefs.last_saved = self.controller.last_saved();
        self.repo.save(&self.prefs)?;
        info!(
            "event=session_close module=session status=ok flushed={}",
            flushed.is_some()
        );

        match flushed {
            Some(Err(err)) => Err(SessionError::Flush(err)),
            _ => Ok(self.prefs),
        }
    }
}
