//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "station", version, about = "Environmental telemetry node")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/station.toml")]
    pub config: PathBuf,

    /// Log and print reports as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins if set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run measurement cycles until Ctrl-C (or --cycles are done)
    Run {
        /// Stop after this many cycles
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        cycles: Option<u64>,
        /// Compute and print reports without uploading them
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Read every sensor once and report which readings are usable
    SelfCheck,
    /// Print the effective configuration (file merged over defaults)
    ShowConfig,
}
