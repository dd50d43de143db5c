//! `simplenotes` terminal front end.
//!
//! # Responsibility
//! - Resolve configuration, start logging, and run the editor loop on a
//!   single-threaded runtime.

mod app;
mod cli;
mod command;

use clap::Parser;
use simplenotes_core::{flush_logging, init_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = cli::Cli::parse().into_config()?;

    let log_dir = config.log_dir()?;
    if let Err(err) = init_logging(config.log_level(), &log_dir) {
        // Editing still works without a log file.
        eprintln!("warning: logging disabled: {err}");
    }

    let result = app::run(config).await;
    flush_logging();
    result
}
