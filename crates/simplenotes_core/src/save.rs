//! Debounced save controller.
//!
//! # Responsibility
//! - Coalesce bursts of note edits into one write to the secure store.
//! - Publish the last-saved timestamp and write failures to the UI.
//!
//! # Invariants
//! - At most one pending save exists; each edit cancels the previous one.
//! - Only a successful write moves `last_saved` forward.
//! - Store failures never propagate to the edit path and never touch the
//!   caller's in-memory text.
//! - An edit stays unsaved until a write of that edit (or a later one)
//!   succeeds; a failed write keeps it unsaved for `flush`.
//! - Writes are serialized; a write older than the last persisted edit is
//!   skipped.
//! - Note content is never logged; only its byte length.

use crate::debounce::Debouncer;
use crate::store::{SecureStore, StoreResult, NOTES_KEY};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Quiet period between the last edit and the write.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_secs(3);

/// Save controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Store key receiving the note body.
    pub key: String,
    /// Debounce delay.
    pub delay: Duration,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            key: NOTES_KEY.to_string(),
            delay: DEFAULT_SAVE_DELAY,
        }
    }
}

/// Snapshot of save progress published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStatus {
    /// Epoch milliseconds of the last successful write.
    pub last_saved: Option<i64>,
    /// Successful writes since the controller was created.
    pub write_count: u64,
    /// Message of the most recent failed write; cleared by the next success.
    pub last_failure: Option<String>,
}

/// Edit sequence numbers shared with pending-save tasks.
#[derive(Debug, Default)]
struct EditLedger {
    /// Sequence of the latest edit.
    edited: AtomicU64,
    /// Sequence of the latest edit known to be persisted.
    saved: AtomicU64,
    writing: Mutex<()>,
}

impl EditLedger {
    fn record_edit(&self) -> u64 {
        self.edited.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn mark_saved(&self, sequence: u64) {
        self.saved.fetch_max(sequence, Ordering::SeqCst);
    }

    fn latest(&self) -> u64 {
        self.edited.load(Ordering::SeqCst)
    }

    fn has_unsaved(&self) -> bool {
        self.saved.load(Ordering::SeqCst) < self.latest()
    }

    /// Runs `write` for edit `sequence` unless a later edit is already saved.
    fn persist<F>(&self, sequence: u64, write: F) -> Option<StoreResult<()>>
    where
        F: FnOnce() -> StoreResult<()>,
    {
        let _guard = self.writing.lock().unwrap_or_else(PoisonError::into_inner);
        if self.saved.load(Ordering::SeqCst) >= sequence {
            debug!("event=note_write module=save status=skipped reason=stale sequence={sequence}");
            return None;
        }
        let result = write();
        if result.is_ok() {
            self.mark_saved(sequence);
        }
        Some(result)
    }
}

/// Owns the pending save and writes through to the secure store.
pub struct SaveController {
    store: Arc<dyn SecureStore>,
    key: String,
    debouncer: Debouncer,
    status: Arc<watch::Sender<SaveStatus>>,
    ledger: Arc<EditLedger>,
}

impl SaveController {
    /// Creates a controller whose pending saves run on `runtime`.
    ///
    /// `last_saved` seeds the published status, typically from persisted
    /// preferences.
    pub fn new(
        store: Arc<dyn SecureStore>,
        options: SaveOptions,
        runtime: Handle,
        last_saved: Option<i64>,
    ) -> Self {
        let (status, _) = watch::channel(SaveStatus {
            last_saved,
            ..SaveStatus::default()
        });
        Self {
            store,
            key: options.key,
            debouncer: Debouncer::new(options.delay, runtime),
            status: Arc::new(status),
            ledger: Arc::new(EditLedger::default()),
        }
    }

    /// Reads the stored note once at startup.
    ///
    /// Returns an empty string when the key is absent or the read fails.
    /// Never schedules a save and never changes `last_saved`.
    pub fn load_initial(&self) -> String {
        match self.store.get(&self.key) {
            Ok(Some(text)) => {
                info!(
                    "event=note_load module=save status=ok found=true text_len={}",
                    text.len()
                );
                text
            }
            Ok(None) => {
                info!("event=note_load module=save status=ok found=false");
                String::new()
            }
            Err(err) => {
                warn!(
                    "event=note_load module=save status=error error_code=store_read_failed error={}",
                    err
                );
                String::new()
            }
        }
    }

    /// Records an edit and restarts the save delay.
    ///
    /// Must be called for every mutation, including clearing to `""`.
    pub fn on_text_changed(&mut self, new_text: impl Into<String>) {
        let text = new_text.into();
        debug!(
            "event=note_changed module=save status=ok text_len={} superseded={}",
            text.len(),
            self.debouncer.is_pending()
        );

        let sequence = self.ledger.record_edit();
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let status = Arc::clone(&self.status);
        let ledger = Arc::clone(&self.ledger);
        self.debouncer.schedule(move || {
            ledger.persist(sequence, || {
                write_through(store.as_ref(), &key, &text, &status, "debounce")
            });
        });
    }

    /// Writes `current_text` immediately when an edit is still pending or
    /// its last write attempt failed.
    ///
    /// Returns `None` when everything is already persisted.
    pub fn flush(&mut self, current_text: &str) -> Option<StoreResult<()>> {
        let cancelled = self.debouncer.cancel();
        if !cancelled && !self.ledger.has_unsaved() {
            return None;
        }
        let sequence = self.ledger.latest();
        self.ledger.persist(sequence, || {
            write_through(
                self.store.as_ref(),
                &self.key,
                current_text,
                &self.status,
                "flush",
            )
        })
    }

    /// Returns whether some edit has not been persisted yet, either because
    /// its save is pending or because the write failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.ledger.has_unsaved()
    }

    /// Returns whether an edit is waiting to be written.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// Epoch milliseconds of the last successful write.
    pub fn last_saved(&self) -> Option<i64> {
        self.status.borrow().last_saved
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Subscribes to status updates published after every write attempt.
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn write_through(
    store: &dyn SecureStore,
    key: &str,
    text: &str,
    status: &watch::Sender<SaveStatus>,
    trigger: &str,
) -> StoreResult<()> {
    let started_at = Instant::now();
    match store.set(key, text) {
        Ok(()) => {
            let saved_at = now_epoch_ms();
            status.send_modify(|current| {
                current.last_saved = Some(saved_at);
                current.write_count += 1;
                current.last_failure = None;
            });
            info!(
                "event=note_save module=save status=ok trigger={} text_len={} duration_ms={}",
                trigger,
                text.len(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            status.send_modify(|current| current.last_failure = Some(err.to_string()));
            error!(
                "event=note_save module=save status=error trigger={} duration_ms={} error_code=store_write_failed error={}",
                trigger,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
