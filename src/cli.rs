use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "batchscan")]
#[command(about = "Batch scan orchestration: file indexing, phases and persistence", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a project described by a configuration file
    Scan {
        /// Path to the project configuration file
        #[arg(short, long, default_value = "batchscan.toml")]
        project: PathBuf,

        /// Do not import raw source text into snapshots
        #[arg(long)]
        no_import_sources: bool,
    },
}
