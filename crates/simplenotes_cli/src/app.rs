//! Interactive editor loop.
//!
//! # Responsibility
//! - Feed every edit to the note session and run toolbar commands.
//! - Print the last-saved time whenever a write completes.
//!
//! # Invariants
//! - Store failures are printed and logged; the loop keeps running.
//! - End of input behaves like `:quit`.

use crate::command::{parse_line, Command, HELP};
use anyhow::Context;
use chrono::{DateTime, Local, TimeZone, Utc};
use log::{info, warn};
use simplenotes_core::{AppConfig, NoteSession, PreferencesRepository, SaveStatus, SessionError};
use std::fmt::Display;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

const TIMESTAMP_FORMAT: &str = "%b %-d, %Y at %-I:%M:%S %p";

/// Runs the editor until `:quit` or end of input.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let mut session = NoteSession::open_with_config(&config, Handle::current())
        .context("failed to open note session")?;
    let mut status_updates = session.subscribe();
    let mut clipboard: Option<arboard::Clipboard> = None;

    println!("SimpleNotes {} (`:help` for commands)", env!("CARGO_PKG_VERSION"));
    print_note(&session);
    println!("Last Saved: {}", format_last_saved(session.last_saved()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                let command = parse_line(&line);
                if command == Command::Quit {
                    break;
                }
                execute(&mut session, &mut clipboard, command);
            }
            Ok(()) = status_updates.changed() => {
                let status = status_updates.borrow_and_update().clone();
                print_status_change(&status);
            }
        }
    }

    match session.close() {
        Ok(prefs) => {
            println!("Last Saved: {}", format_last_saved(prefs.last_saved));
            Ok(())
        }
        Err(SessionError::Flush(err)) => {
            eprintln!("warning: note was not saved before exit: {err}");
            Ok(())
        }
        Err(err) => Err(err).context("failed to persist preferences"),
    }
}

fn execute<R: PreferencesRepository>(
    session: &mut NoteSession<R>,
    clipboard: &mut Option<arboard::Clipboard>,
    command: Command,
) {
    match command {
        Command::Append(text) => session.append_line(&text),
        Command::Show => print_note(session),
        Command::Clear => {
            if session.clear() {
                println!("(note cleared)");
            }
        }
        Command::Copy => match copy_to_clipboard(clipboard, session.text()) {
            Ok(()) => println!("(copied {} characters)", session.text().chars().count()),
            Err(err) => {
                warn!("event=clipboard_copy module=cli status=error error={err}");
                eprintln!("copy failed: {err}");
            }
        },
        Command::Bigger => println!("font size: {}", session.increase_font_size()),
        Command::Smaller => println!("font size: {}", session.decrease_font_size()),
        Command::ResetSize => println!("font size: {}", session.reset_font_size()),
        Command::Status => {
            let status = session.save_status();
            println!("Last Saved: {}", format_last_saved(status.last_saved));
            println!("pending save: {}", session.is_save_pending());
            println!("unsaved changes: {}", session.has_unsaved_changes());
            println!("writes this session: {}", status.write_count);
            if let Some(failure) = status.last_failure {
                println!("last failure: {failure}");
            }
            println!("font size: {}", session.font_size());
        }
        Command::Help => println!("{HELP}"),
        Command::Unknown(name) => println!("unknown command `:{name}`; try `:help`"),
        Command::Quit => {}
    }
}

fn copy_to_clipboard(
    clipboard: &mut Option<arboard::Clipboard>,
    text: &str,
) -> Result<(), arboard::Error> {
    // Kept alive for the whole session; on X11 the contents vanish with it.
    if clipboard.is_none() {
        *clipboard = Some(arboard::Clipboard::new()?);
    }
    let Some(clipboard) = clipboard.as_mut() else {
        return Ok(());
    };
    clipboard.clear()?;
    clipboard.set_text(text.to_string())?;
    info!("event=clipboard_copy module=cli status=ok text_len={}", text.len());
    Ok(())
}

fn print_note<R: PreferencesRepository>(session: &NoteSession<R>) {
    println!("--- note ({}pt) ---", session.font_size());
    print!("{}", session.text());
    if !session.text().is_empty() && !session.text().ends_with('\n') {
        println!();
    }
    println!("--- end ---");
}

fn print_status_change(status: &SaveStatus) {
    match &status.last_failure {
        Some(failure) => eprintln!("save failed: {failure} (edits are kept; next edit or :quit retries)"),
        None => println!("Last Saved: {}", format_last_saved(status.last_saved)),
    }
}

fn format_last_saved(epoch_ms: Option<i64>) -> String {
    format_timestamp(epoch_ms, &Local)
}

fn format_timestamp<Tz>(epoch_ms: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match epoch_ms.and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(utc) => utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        None => "never".to_string(),
    }
}
