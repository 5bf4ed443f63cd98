//! Population registry shell.
//!
//! Opens a registry directory (or an in-memory one with `--ephemeral`)
//! and runs the interactive command loop on stdin/stdout. Logs go to
//! stderr and are filtered by `--log-level` or `RUST_LOG`.

mod editor;
mod render;
mod repl;

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use population_engine::PopulationConfig;
use population_executor::Population;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::editor::Editor;
use crate::repl::Repl;

const HISTORY_FILE_NAME: &str = ".population_history";

/// Interactive shell for the population registry.
#[derive(Parser, Debug)]
#[command(name = "population", version, about = "Interactive shell for the population registry")]
struct Cli {
    /// Registry directory
    #[arg(long, default_value = "population-data")]
    db: PathBuf,

    /// Keep everything in memory
    #[arg(long, conflicts_with = "db")]
    ephemeral: bool,

    /// Configuration file to use instead of the one in the registry directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let db = open(&cli)?;
    info!(path = ?db.database().path(), "Registry opened");

    let history_file = db.database().path().map(|dir| dir.join(HISTORY_FILE_NAME));
    let editor = Editor::new(history_file).context("failed to start line editor")?;

    Repl::new(db.clone(), editor, io::stdout().lock())
        .run()
        .context("failed to write to stdout")?;

    db.flush().context("failed to flush registry")?;
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open(cli: &Cli) -> anyhow::Result<Population> {
    let config = cli
        .config
        .as_deref()
        .map(|path| {
            PopulationConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        })
        .transpose()?;

    let db = match (cli.ephemeral, config) {
        (true, Some(config)) => Population::cache_with_config(config),
        (true, None) => Population::cache(),
        (false, Some(config)) => Population::open_with_config(&cli.db, config),
        (false, None) => Population::open(&cli.db),
    };
    db.with_context(|| format!("failed to open registry at {}", cli.db.display()))
}
