//! CLI argument definitions (§6: `process`, `export`, `list`, `status`,
//! `clear` — `help`/`quit` are handled by clap/the shell itself).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "boq-tools")]
#[command(about = "Bill-of-quantities spreadsheet analysis and normalization pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a `.boq-tools.toml` config file, overriding ancestor-directory discovery.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity; repeat for more detail (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline over a workbook and print a summary.
    Process {
        /// Path to the workbook file.
        file: PathBuf,

        /// Process every file under a directory instead of a single file.
        #[arg(long)]
        batch: bool,

        /// Where to write the resulting FileMapping JSON (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the most recently processed mapping or table.
    Export {
        /// Which artifact to export: `mapping` or `review-artifact`.
        key: String,

        /// Destination path.
        path: PathBuf,

        /// Export format: json, summary, delimited-text.
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// List known categories and mapping counts.
    List,

    /// Show the status of the last processed file.
    Status,

    /// Clear cached mapping/dictionary state for the current session.
    Clear,
}
