//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Build a yearly watch recap for one user and print it as JSON.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Tautulli user id to build the recap for
    #[arg(short, long, env = "RECAP_USER_ID")]
    pub user_id: u64,

    /// Recap year; defaults to the current year in the configured time zone
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Overseerr user id, enables request statistics
    #[arg(long)]
    pub overseerr_user_id: Option<u64>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level, overriding the configuration
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}
