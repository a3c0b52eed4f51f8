pub mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ranksnap")]
#[command(about = "Scrape ranked category listings into a clean tabular snapshot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape one category and write the cleaned snapshot
    Scrape {
        /// Category identifier used to build page URLs
        category: String,

        /// Output directory for the snapshot files
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,

        /// Override the configured page URL template
        #[arg(long)]
        url_template: Option<String>,

        /// Override the configured page ceiling
        #[arg(long)]
        max_pages: Option<u32>,

        /// Snapshot date (defaults to today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
    },
    /// Re-run the cleaner over a previously written raw snapshot
    Clean {
        /// Raw snapshot CSV written by `scrape`
        input: PathBuf,

        /// Category recorded in the cleaned rows
        #[arg(short, long)]
        category: String,

        /// Snapshot date recorded in the cleaned rows (defaults to today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output path (defaults to `<input stem>_clean.csv`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
