//! Command-line front end for the Ojas conversation memory.

mod commands;
mod setup;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::run;
use log::{debug, info, warn};
use ojas_memory::{ConversationMemory, FileStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the memory client.
#[derive(Parser)]
#[command(name = "ojas", version)]
struct Cli {
    /// Optional path to an ojas.json5 config file (disables layering)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Data directory holding the persisted memory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

/// Operations on the stored conversation memory.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub(crate) enum Command {
    /// Append a chat turn; user turns are scanned for profile facts
    Say {
        /// Turn author: user, assistant, or system
        #[arg(long, default_value = "user")]
        role: String,
        text: String,
    },
    /// Print recent turns as JSON
    Recent {
        #[arg(long)]
        count: Option<usize>,
    },
    /// Print the prompt digest of the user profile
    Context,
    /// Print the merged user info as JSON
    Info,
    /// Merge a user info fragment given as JSON
    Update { json: String },
    /// Report numeric health metrics as key=value pairs
    Metrics {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Clear messages, user info, and the stored profile
    Clear,
    /// Onboarding profile accessors
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub(crate) enum ProfileAction {
    /// Print the stored profile as JSON
    Show,
    /// Replace the stored profile with the JSON file at `path`
    Save { path: PathBuf },
    /// Delete the stored profile
    Clear,
}

/// Entry point for the Ojas CLI.
fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    info!(
        "starting ojas (config_set={}, data_dir_set={})",
        cli.config.is_some(),
        cli.data_dir.is_some()
    );
    let config = setup::load_config(cli.config.as_deref())?;
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.storage.resolved_path())
        .context("no data directory; pass --data-dir or set storage.path")?;
    debug!("using data directory: {}", data_dir.display());

    let store = Arc::new(FileStore::new(&data_dir).context("failed to open data directory")?);
    let memory = ConversationMemory::init(store, setup::memory_options(&config))
        .context("failed to initialize conversation memory")?;

    let output = run(&memory, cli.command);
    if let Some(error) = memory.last_persist_error() {
        warn!("changes were not saved: {error}");
    }
    memory.dispose();

    if let Some(output) = output? {
        println!("{output}");
    }
    Ok(())
}
