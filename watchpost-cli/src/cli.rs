//! CLI argument definitions for watchpost.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.
//! CLI flags take precedence over the config file and environment
//! variables.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Watchpost access log monitor.
///
/// Follows an HTTP access log, maintains rolling per-section
/// statistics, and raises/clears a high-traffic alert.
#[derive(Parser, Debug)]
#[command(name = "watchpost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to watchpost.toml configuration file.
    ///
    /// When omitted, `./watchpost.toml` is used if it exists,
    /// otherwise built-in defaults apply.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the access log and print live statistics and alerts
    Watch(WatchArgs),
    /// Write synthetic access log lines for demo and testing
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Location of log file to parse.
    #[arg(short, long)]
    pub file: Option<String>,

    /// Number of requests per second that triggers the alert.
    #[arg(short, long)]
    pub threshold: Option<u32>,

    /// Duration in seconds of the sampling window for alerts.
    #[arg(short, long)]
    pub window: Option<u64>,

    /// Seconds between statistics table prints.
    #[arg(long, default_value_t = 10)]
    pub display_interval: u64,

    /// Print statistics snapshots as JSON lines instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Location of log file to write.
    #[arg(short, long)]
    pub file: Option<String>,

    /// Number of requests per second to write.
    #[arg(short, long, default_value_t = 10)]
    pub rate: u32,
}
