#![allow(dead_code)]

use simplenotes_core::{SecureStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// One successful `set` observed by the store.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub at: Instant,
    pub key: String,
    pub value: String,
}

/// In-memory store that records every write with the (virtual) time it ran.
#[derive(Default)]
pub struct RecordingStore {
    entries: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<RecordedWrite>>,
    write_attempts: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn written_values(&self) -> Vec<String> {
        self.writes().into_iter().map(|write| write.value).collect()
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl SecureStore for RecordingStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.writes.lock().unwrap().push(RecordedWrite {
            at: Instant::now(),
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

/// Asserts a virtual-time offset within one millisecond of timer rounding.
pub fn assert_offset(actual: Duration, expected: Duration) {
    let delta = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        delta <= Duration::from_millis(1),
        "expected offset {expected:?}, got {actual:?}"
    );
}
