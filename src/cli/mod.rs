//! Edgewatch CLI
//!
//! Commands:
//! - `edgewatch watch` - Live value-bet table with background refresh
//! - `edgewatch snapshot` - One-off fetch of the current value bets
//! - `edgewatch predict` - Match prediction for two players
//! - `edgewatch search` - Player lookup (interactive when no query is given)

pub mod commands;
pub mod output;

use crate::domain::Surface;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Live value-bet monitor for the tennis prediction backend
#[derive(Parser, Debug)]
#[command(name = "edgewatch")]
#[command(author, version, about = "Live value-bet monitor for a tennis prediction backend")]
pub struct Cli {
    /// Configuration directory (default.toml, {EDGEWATCH_ENV}.toml)
    #[arg(long, global = true, default_value = "config")]
    pub config: PathBuf,

    /// Backend base URL (overrides api.base_url)
    #[arg(long, global = true, env = "EDGEWATCH_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Keep the value-bet table in sync with the backend
    Watch {
        /// Refresh cadence while healthy (overrides sync.base_interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Status server port (overrides status_port)
        #[arg(long)]
        status_port: Option<u16>,
        /// Emit one JSON state per line instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Fetch and print the current value bets once
    Snapshot {
        #[arg(long)]
        json: bool,
    },

    /// Predict the outcome of a match
    Predict {
        #[arg(long)]
        player_a: String,
        #[arg(long)]
        player_b: String,
        /// Court surface (hard, clay, grass)
        #[arg(long)]
        surface: Surface,
        /// Decimal bookmaker odds for player A
        #[arg(long, requires = "odds_b")]
        odds_a: Option<f64>,
        /// Decimal bookmaker odds for player B
        #[arg(long, requires = "odds_a")]
        odds_b: Option<f64>,
        #[arg(long)]
        json: bool,
    },

    /// Search players by name; reads edits from stdin when no query is given
    Search {
        query: Option<String>,
        /// Maximum results (overrides search.limit)
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        json: bool,
    },
}
