//! Domain values shared by the session and persistence layers.

pub mod preferences;
