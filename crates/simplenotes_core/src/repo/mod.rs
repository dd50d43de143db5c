//! Repository layer for preference persistence.
//!
//! # Responsibility
//! - Define the load/save contract used by the session at process
//!   boundaries.
//! - Keep SQLite query details out of the session.

pub mod preferences_repo;
