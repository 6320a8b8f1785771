//! CLI argument parsing for benchdiff

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for report tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text tables (default)
    Text,
    /// JSON array of tables for machine parsing
    Json,
    /// CSV, one header row per table
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "benchdiff")]
#[command(version)]
#[command(
    about = "Compare benchmark results across environments: validation, run matching and ranked diffs",
    long_about = None
)]
pub struct Cli {
    /// Measurement snapshot (JSON) to analyze
    #[arg(short, long, value_name = "PATH", env = "BENCHDIFF_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Comma-separated SQL LIKE patterns selecting environments by name (% and _ wildcards)
    #[arg(
        short,
        long,
        value_name = "LIST",
        env = "ENVIRONMENTS",
        default_value = "%",
        value_delimiter = ','
    )]
    pub environments: Vec<String>,

    /// Report to produce (repeatable): validation, health, diffs, top, histogram, runs, environments
    #[arg(short, long = "report", value_name = "NAME")]
    pub reports: Vec<String>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output file, `-` for stdout
    #[arg(short, long, value_name = "PATH", default_value = "-")]
    pub output: PathBuf,

    /// Additionally write one CSV file per report into this directory
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Analysis configuration (TOML)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether output goes to stdout
    pub fn writes_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}
