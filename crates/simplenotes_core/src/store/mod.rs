//! Secure text store capability and backends.
//!
//! # Responsibility
//! - Define the minimal `{get, set}` capability the save path depends on.
//! - Keep platform credential-store details out of the save controller.
//!
//! # Invariants
//! - An absent key is `Ok(None)`, never an error.
//! - Backends must be shareable across the UI task and the pending-save task.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod keychain;
mod memory;

pub use keychain::KeyringStore;
pub use memory::MemoryStore;

/// Store key holding the note body.
pub const NOTES_KEY: &str = "notes";

/// Default credential-store namespace.
pub const DEFAULT_SERVICE: &str = "com.lefthandedapps.SimpleNotes";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by secure store backends.
#[derive(Debug)]
pub enum StoreError {
    /// Platform credential store rejected the operation.
    Keyring(keyring::Error),
    /// Backend state is unusable (poisoned lock, detached handle).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyring(err) => write!(f, "credential store error: {err}"),
            Self::Unavailable(details) => write!(f, "store unavailable: {details}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Keyring(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<keyring::Error> for StoreError {
    fn from(value: keyring::Error) -> Self {
        Self::Keyring(value)
    }
}

/// Key-value capability backed by a secure credential store.
pub trait SecureStore: Send + Sync {
    /// Reads one value; `None` when the key has never been written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Writes one value, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}
