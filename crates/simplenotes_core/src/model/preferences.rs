//! User preference model.
//!
//! # Responsibility
//! - Hold the editor font size and the last-saved timestamp.
//! - Provide the font-size controls bound to the editor toolbar.
//!
//! # Invariants
//! - `font_size` always stays within `MIN_FONT_SIZE..=MAX_FONT_SIZE`.
//! - `last_saved` only moves forward through completed note writes.

pub const DEFAULT_FONT_SIZE: f64 = 20.0;
pub const FONT_SIZE_STEP: f64 = 1.0;
pub const MIN_FONT_SIZE: f64 = 8.0;
pub const MAX_FONT_SIZE: f64 = 72.0;

/// Preferences persisted next to, but separately from, the note body.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    /// Editor font size in points.
    pub font_size: f64,
    /// Unix epoch milliseconds of the last successful note write.
    pub last_saved: Option<i64>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            last_saved: None,
        }
    }
}

impl Preferences {
    /// Increases the font size by one step; returns the new size.
    pub fn increase_font_size(&mut self) -> f64 {
        self.set_font_size(self.font_size + FONT_SIZE_STEP)
    }

    /// Decreases the font size by one step; returns the new size.
    pub fn decrease_font_size(&mut self) -> f64 {
        self.set_font_size(self.font_size - FONT_SIZE_STEP)
    }

    pub fn reset_font_size(&mut self) -> f64 {
        self.set_font_size(DEFAULT_FONT_SIZE)
    }

    /// Sets the font size, clamped to the supported range.
    ///
    /// Non-finite values fall back to the default size.
    pub fn set_font_size(&mut self, size: f64) -> f64 {
        self.font_size = if size.is_finite() {
            size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
        } else {
            DEFAULT_FONT_SIZE
        };
        self.font_size
    }
}
