//! Command-line arguments for the price updater.
//!
//! Every flag is optional: a bare `price_updater` run uses the config file,
//! environment and built-in defaults. See `main` for how flags are layered on
//! top of the loaded settings.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON config file. Defaults to `price_updater.json` when it exists.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Markdown document whose price section is rewritten.
    #[clap(long)]
    pub document: Option<PathBuf>,

    /// JSON file holding the rolling price history.
    #[clap(long, conflicts_with = "no_history")]
    pub history: Option<PathBuf>,

    /// Do not read or write the history file.
    #[clap(long)]
    pub no_history: bool,

    /// Comma separated coin ids, e.g. `bitcoin,ethereum`.
    #[clap(long, conflicts_with = "coins_file")]
    pub coins: Option<String>,

    /// Text file with coin ids separated by commas, spaces or new lines.
    #[clap(long)]
    pub coins_file: Option<PathBuf>,

    /// Print the patched document instead of writing any file.
    #[clap(long)]
    pub dry_run: bool,
}
