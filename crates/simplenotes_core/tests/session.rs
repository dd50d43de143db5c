mod common;

use common::RecordingStore;
use simplenotes_core::db::{open_db, open_db_in_memory};
use simplenotes_core::{
    AppConfig, NoteSession, PreferencesRepository, SaveOptions, SessionError,
    SqlitePreferencesRepository, StoreBackend, NOTES_KEY,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::sleep;

fn memory_repo() -> SqlitePreferencesRepository {
    SqlitePreferencesRepository::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn file_repo(path: &Path) -> SqlitePreferencesRepository {
    SqlitePreferencesRepository::try_new(open_db(path).unwrap()).unwrap()
}

fn open_session(
    store: &Arc<RecordingStore>,
    repo: SqlitePreferencesRepository,
) -> NoteSession<SqlitePreferencesRepository> {
    NoteSession::open(
        store.clone(),
        repo,
        SaveOptions::default(),
        Handle::current(),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn open_seeds_text_from_store_without_writing() {
    let store = Arc::new(RecordingStore::seeded(NOTES_KEY, "remember milk"));
    let session = open_session(&store, memory_repo());

    assert_eq!(session.text(), "remember milk");
    assert!(!session.is_save_pending());
    sleep(Duration::from_secs(10)).await;
    assert_eq!(store.write_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn appended_lines_are_saved_as_one_write() {
    let store = Arc::new(RecordingStore::new());
    let mut session = open_session(&store, memory_repo());

    session.append_line("first");
    sleep(Duration::from_millis(500)).await;
    session.append_line("second");
    sleep(Duration::from_secs(4)).await;

    assert_eq!(store.written_values(), vec!["first\nsecond\n"]);
    assert_eq!(session.text(), "first\nsecond\n");
    assert!(session.last_saved().is_some());
}

#[tokio::test(start_paused = true)]
async fn assigning_identical_text_is_not_an_edit() {
    let store = Arc::new(RecordingStore::seeded(NOTES_KEY, "same"));
    let mut session = open_session(&store, memory_repo());

    assert!(!session.set_text("same"));
    assert!(!session.is_save_pending());
    assert!(session.set_text("different"));
    assert!(session.is_save_pending());
}

#[tokio::test(start_paused = true)]
async fn clear_saves_empty_note() {
    let store = Arc::new(RecordingStore::seeded(NOTES_KEY, "to be removed"));
    let mut session = open_session(&store, memory_repo());

    assert!(session.clear());
    assert!(!session.clear());
    sleep(Duration::from_secs(4)).await;

    assert_eq!(session.text(), "");
    assert_eq!(store.value(NOTES_KEY).as_deref(), Some(""));
}

#[tokio::test(start_paused = true)]
async fn write_failure_keeps_typed_text() {
    let store = Arc::new(RecordingStore::new());
    store.fail_writes(true);
    let mut session = open_session(&store, memory_repo());

    session.set_text("unsaved but kept");
    sleep(Duration::from_secs(4)).await;

    assert_eq!(session.text(), "unsaved but kept");
    assert!(session.save_status().last_failure.is_some());
    assert_eq!(session.last_saved(), None);
}

#[tokio::test(start_paused = true)]
async fn close_flushes_pending_edit_and_persists_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("preferences.sqlite3");
    let store = Arc::new(RecordingStore::new());

    let mut session = open_session(&store, file_repo(&db_path));
    session.set_text("typed right before quit");
    session.increase_font_size();
    let closed = session.close().unwrap();

    assert_eq!(store.written_values(), vec!["typed right before quit"]);
    assert_eq!(closed.font_size, 21.0);
    assert!(closed.last_saved.is_some());

    let reloaded = file_repo(&db_path).load().unwrap();
    assert_eq!(reloaded, closed);

    let reopened = open_session(&store, file_repo(&db_path));
    assert_eq!(reopened.text(), "typed right before quit");
    assert_eq!(reopened.font_size(), 21.0);
    assert_eq!(reopened.last_saved(), closed.last_saved);
}

#[tokio::test(start_paused = true)]
async fn close_reports_flush_failure_after_saving_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("preferences.sqlite3");
    let store = Arc::new(RecordingStore::new());
    store.fail_writes(true);

    let mut session = open_session(&store, file_repo(&db_path));
    session.set_text("cannot save");
    session.decrease_font_size();
    let err = session.close().err().unwrap();

    assert!(matches!(err, SessionError::Flush(_)));
    let reloaded = file_repo(&db_path).load().unwrap();
    assert_eq!(reloaded.font_size, 19.0);
    assert_eq!(reloaded.last_saved, None);
}

#[tokio::test(start_paused = true)]
async fn close_persists_text_whose_debounced_write_failed() {
    let store = Arc::new(RecordingStore::new());
    store.fail_writes(true);
    let mut session = open_session(&store, memory_repo());

    session.set_text("important");
    sleep(Duration::from_secs(4)).await;
    assert!(!session.is_save_pending());
    assert_eq!(store.write_attempts(), 1);
    assert!(session.has_unsaved_changes());

    store.fail_writes(false);
    let closed = session.close().unwrap();

    assert_eq!(store.value(NOTES_KEY).as_deref(), Some("important"));
    assert_eq!(store.write_attempts(), 2);
    assert!(closed.last_saved.is_some());
}

#[tokio::test(start_paused = true)]
async fn close_reports_failure_when_retry_of_failed_write_fails_again() {
    let store = Arc::new(RecordingStore::new());
    store.fail_writes(true);
    let mut session = open_session(&store, memory_repo());

    session.set_text("still failing");
    sleep(Duration::from_secs(4)).await;

    let err = session.close().err().unwrap();
    assert!(matches!(err, SessionError::Flush(_)));
    assert_eq!(store.value(NOTES_KEY), None);
}

#[tokio::test(start_paused = true)]
async fn invalid_persisted_preferences_fall_back_to_defaults() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO preferences (key, value, updated_at) VALUES ('last_saved', 'yesterday', 0);",
        [],
    )
    .unwrap();
    let repo = SqlitePreferencesRepository::try_new(conn).unwrap();
    let store = Arc::new(RecordingStore::new());

    let session = open_session(&store, repo);
    assert_eq!(session.font_size(), 20.0);
    assert_eq!(session.last_saved(), None);
}

#[tokio::test(start_paused = true)]
async fn open_with_config_creates_preferences_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        data_dir: Some(dir.path().join("data")),
        store: StoreBackend::Memory,
        debounce_ms: 250,
        ..AppConfig::default()
    };

    let mut session = NoteSession::open_with_config(&config, Handle::current()).unwrap();
    assert_eq!(session.text(), "");
    session.set_text("ephemeral");
    sleep(Duration::from_millis(300)).await;
    assert!(session.last_saved().is_some());

    session.close().unwrap();
    assert!(config.preferences_db_path().unwrap().exists());
}
