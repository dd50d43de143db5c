//! Preferences repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Load and save `Preferences` as key/value rows.
//! - Reject persisted values that cannot be parsed instead of masking them.
//!
//! # Invariants
//! - `save` replaces every preference row in a single transaction.
//! - A missing row loads as the field default.

use crate::db::DbError;
use crate::model::preferences::Preferences;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FONT_SIZE_KEY: &str = "font_size";
const LAST_SAVED_KEY: &str = "last_saved";

pub type PrefsResult<T> = Result<T, PrefsError>;

/// Error for preference persistence operations.
#[derive(Debug)]
pub enum PrefsError {
    Db(DbError),
    /// Schema is missing a table required by this repository.
    MissingRequiredTable(&'static str),
    /// A stored value does not parse as its field type.
    InvalidData { key: &'static str, value: String },
}

impl Display for PrefsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::InvalidData { key, value } => {
                write!(f, "invalid persisted preference `{key}`: `{value}`")
            }
        }
    }
}

impl Error for PrefsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for PrefsError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PrefsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Load/save contract for user preferences.
pub trait PreferencesRepository {
    fn load(&self) -> PrefsResult<Preferences>;
    fn save(&mut self, prefs: &Preferences) -> PrefsResult<()>;
}

/// SQLite-backed preferences repository owning its connection.
pub struct SqlitePreferencesRepository {
    conn: Connection,
}

impl SqlitePreferencesRepository {
    /// Wraps a migrated connection, verifying the schema first.
    pub fn try_new(conn: Connection) -> PrefsResult<Self> {
        if !table_exists(&conn, "preferences")? {
            return Err(PrefsError::MissingRequiredTable("preferences"));
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PreferencesRepository for SqlitePreferencesRepository {
    fn load(&self) -> PrefsResult<Preferences> {
        let mut prefs = Preferences::default();

        if let Some(raw) = read_value(&self.conn, FONT_SIZE_KEY)? {
            let size = raw.parse::<f64>().map_err(|_| PrefsError::InvalidData {
                key: FONT_SIZE_KEY,
                value: raw.clone(),
            })?;
            prefs.set_font_size(size);
        }

        if let Some(raw) = read_value(&self.conn, LAST_SAVED_KEY)? {
            let saved_at = raw.parse::<i64>().map_err(|_| PrefsError::InvalidData {
                key: LAST_SAVED_KEY,
                value: raw.clone(),
            })?;
            prefs.last_saved = Some(saved_at);
        }

        Ok(prefs)
    }

    fn save(&mut self, prefs: &Preferences) -> PrefsResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        upsert_value(&tx, FONT_SIZE_KEY, &prefs.font_size.to_string())?;
        match prefs.last_saved {
            Some(saved_at) => upsert_value(&tx, LAST_SAVED_KEY, &saved_at.to_string())?,
            None => {
                tx.execute(
                    "DELETE FROM preferences WHERE key = ?1;",
                    [LAST_SAVED_KEY],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn read_value(conn: &Connection, key: &str) -> PrefsResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1;",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

fn upsert_value(conn: &Connection, key: &str, value: &str) -> PrefsResult<()> {
    conn.execute(
        "INSERT INTO preferences (key, value, updated_at)
         VALUES (?1, ?2, strftime('%s', 'now') * 1000)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, value],
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> PrefsResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
