//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// carelog: care-record preprocessing and ICF annotation
#[derive(Parser)]
#[command(name = "carelog")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drop administrative categories and write one CSV per floor
    Split {
        /// Path to the facility export (CSV/TSV, UTF-8, Shift_JIS or EUC-JP)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory for the floor files (default: next to FILE)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Text between the file stem and the floor name
        #[arg(long, default_value = "_processed_temp")]
        suffix: String,
    },

    /// Annotate care-log entries and write the merged rows as JSON
    Evaluate {
        /// Path to a floor file or any table with a 内容 column
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Path of the JSON file to write
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Use the offline mock provider and static retrieval
        #[arg(long)]
        mock_llm: bool,

        /// Prompt calls in flight at once during batched passes
        #[arg(long, default_value = "16")]
        concurrency: usize,

        /// Only evaluate the first N rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Serve the care-plan tagging API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the HTTP server
        #[arg(short, long, env = "PORT", default_value = "5328")]
        port: u16,

        /// Use the offline mock provider and static retrieval
        #[arg(long)]
        mock_llm: bool,
    },
}
