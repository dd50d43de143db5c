//! Command-line arguments.

use clap::Parser;
use simplenotes_core::{AppConfig, ConfigError, StoreBackend};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "simplenotes",
    version,
    about = "Single-note scratchpad with debounced auto-save to the system keychain",
    long_about = "Type lines to append them to the note. Lines starting with `:` are commands;\n\
                  start a line with `::` to append text beginning with a colon.\n\
                  Run `:help` inside the editor for the command list."
)]
pub struct Cli {
    /// JSON configuration file. Flags override values read from it.
    #[arg(long, value_name = "PATH", env = "SIMPLENOTES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the preferences database.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for rolling log files (default: <data-dir>/logs).
    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Quiet period before an edit is saved.
    #[arg(long = "debounce-ms", value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Keychain service namespace the note is stored under.
    #[arg(long = "keyring-service", value_name = "SERVICE")]
    pub keyring_service: Option<String>,

    /// Keep the note in memory only; nothing is written to the keychain.
    #[arg(long)]
    pub ephemeral: bool,
}

impl Cli {
    /// Resolves the effective configuration: file values, then flags.
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(dir) = self.data_dir {
            config.data_dir = Some(absolutize(&dir));
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = Some(absolutize(&dir));
        }
        if let Some(level) = self.log_level {
            config.log_level = Some(level);
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.debounce_ms = debounce_ms;
        }
        if let Some(service) = self.keyring_service {
            config.keyring_service = service;
        }
        if self.ephemeral {
            config.store = StoreBackend::Memory;
        }

        config.validate()?;
        Ok(config)
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
