//! Command-line parsing for the ladder trend service.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use clap::{Parser, Subcommand};

use crate::domain::SOLO_LADDER;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "trend", version, about = "Ladder rating trend service (aoe4world-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `/get_player_data` and `/find_player` over HTTP.
    Serve(ServeArgs),
    /// Run the trend pipeline once for a player and print the series.
    Fetch(FetchArgs),
    /// Search recently active players by name.
    Search(SearchArgs),
}

/// Overrides for the environment-derived configuration.
#[derive(Debug, Parser, Clone, Default)]
pub struct ServeArgs {
    /// Listen address (overrides BIND_ADDR).
    #[arg(long)]
    pub bind: Option<String>,

    /// Maximum number of history pages per request, 0 for unbounded (overrides MAX_PAGES).
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Fail requests when the raw dump cannot be written (overrides STRICT_DUMP).
    #[arg(long)]
    pub strict_dump: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// aoe4world profile id.
    #[arg(short = 'p', long = "player")]
    pub player_id: i64,

    /// Leaderboard: `rm_solo` for 1v1, anything else for team games.
    #[arg(short = 'g', long, default_value = SOLO_LADDER)]
    pub game_type: String,

    /// Maximum number of history pages, 0 for unbounded (overrides MAX_PAGES).
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Do not write the raw `game_data_<name>.json` dump.
    #[arg(long)]
    pub no_dump: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct SearchArgs {
    /// Name (or part of it) to search for.
    pub query: String,

    /// Result page (1-indexed).
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}
