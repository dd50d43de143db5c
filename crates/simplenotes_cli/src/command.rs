//! Editor input parsing.

/// One line of editor input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text appended to the note as a new line.
    Append(String),
    Show,
    Clear,
    Copy,
    Bigger,
    Smaller,
    ResetSize,
    Status,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  :show        print the note
  :clear       delete all text
  :copy        copy the note to the clipboard
  :bigger      increase font size
  :smaller     decrease font size
  :reset-size  restore the default font size
  :status      show save status and preferences
  :quit        save pending edits and exit
Any other line is appended to the note. Start a line with `::` to append
text that begins with `:`.";

pub fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(escaped) = line.strip_prefix("::") {
        return Command::Append(format!(":{escaped}"));
    }
    let Some(name) = line.strip_prefix(':') else {
        return Command::Append(line.to_string());
    };

    match name.trim().to_ascii_lowercase().as_str() {
        "show" | "s" => Command::Show,
        "clear" | "delete" => Command::Clear,
        "copy" | "c" => Command::Copy,
        "bigger" | "+" => Command::Bigger,
        "smaller" | "-" => Command::Smaller,
        "reset-size" | "reset" | "=" => Command::ResetSize,
        "status" => Command::Status,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}
