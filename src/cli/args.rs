use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ranno",
    version,
    about = "Plan running routes from free text, with follow-up questions and safety scoring"
)]
pub struct Cli {
    /// Path to the TOML config file (defaults to the OS config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite data cache
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan a route from a free-text request, answering follow-up questions on stdin
    Plan {
        /// What you want, e.g. "5k loop from the Ferry Building, well lit"
        prompt: Option<String>,

        /// Ask at most this many follow-up questions (0 = none)
        #[arg(long)]
        max_questions: Option<usize>,

        /// Use the local data cache instead of fetching open data
        #[arg(long, default_value_t = false)]
        cached: bool,

        /// Print the finished plan as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the finished plan as JSON to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the waypoints of a circular loop around a point
    Loop {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Desired loop length (km)
        #[arg(long)]
        km: f64,

        #[arg(long, default_value_t = ranno::routing::loop_geometry::DEFAULT_LOOP_POINTS)]
        count: usize,
    },

    /// Score a bounding box against recent incidents
    Risk {
        #[arg(long, allow_hyphen_values = true)]
        south: f64,

        #[arg(long, allow_hyphen_values = true)]
        west: f64,

        #[arg(long, allow_hyphen_values = true)]
        north: f64,

        #[arg(long, allow_hyphen_values = true)]
        east: f64,

        /// Read incidents from the local cache
        #[arg(long, default_value_t = false)]
        cached: bool,
    },

    /// Local open-data cache
    Data {
        #[command(subcommand)]
        cmd: DataCommands,
    },

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum DataCommands {
    /// Download incidents and amenities into the local cache
    Sync,

    /// Show local cache status (path, meta, counts)
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the config file path in use
    Path,

    /// Print the effective configuration as TOML
    Show,
}
