//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration from the environment
//! - sets up logging (stdout/stderr + `log.txt`)
//! - runs the HTTP server or a one-shot CLI command

use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Command, FetchArgs, SearchArgs, ServeArgs};
use crate::data::Aoe4WorldClient;
use crate::domain::{TrendConfig, TrendRequest};
use crate::error::AppError;
use crate::io::{JsonDumpStore, NullSink, ObservationSink};
use crate::server::AppState;

pub mod pipeline;

/// Entry point for the `trend` binary.
pub fn run() -> Result<(), AppError> {
    // `trend` and `trend --bind ...` behave like `trend serve ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let config = TrendConfig::from_env()?;
    let to_stdout = matches!(cli.command, Command::Serve(_));
    let _log_guard = init_tracing(&config, to_stdout)?;

    match cli.command {
        Command::Serve(args) => handle_serve(apply_serve_overrides(config, &args)),
        Command::Fetch(args) => handle_fetch(config, args),
        Command::Search(args) => handle_search(&config, args),
    }
}

fn handle_serve(config: TrendConfig) -> Result<(), AppError> {
    tracing::info!(
        season_start = config.season_start,
        data_dir = %config.data_dir.display(),
        max_pages = ?config.max_pages,
        strict_dump = config.strict_dump,
        "starting server"
    );

    // The blocking client must be built outside the async runtime.
    let client = Arc::new(Aoe4WorldClient::from_config(&config)?);
    let sink = Arc::new(JsonDumpStore::new(config.data_dir.clone()));
    let state = Arc::new(AppState {
        config,
        matches: client.clone(),
        players: client,
        sink,
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::config(format!("Failed to start async runtime: {e}")))?;

    // Hold a reference so the last drop of the blocking client happens here,
    // outside the runtime.
    let keep_alive = state.clone();
    let result = runtime.block_on(crate::server::serve(state));
    drop(runtime);
    drop(keep_alive);
    result
}

fn handle_fetch(config: TrendConfig, args: FetchArgs) -> Result<(), AppError> {
    let config = TrendConfig {
        max_pages: override_max_pages(config.max_pages, args.max_pages),
        ..config
    };
    let client = Aoe4WorldClient::from_config(&config)?;
    let sink: Box<dyn ObservationSink> = if args.no_dump {
        Box::new(NullSink)
    } else {
        Box::new(JsonDumpStore::new(config.data_dir.clone()))
    };
    let request = TrendRequest {
        player_id: args.player_id,
        game_type: args.game_type.clone(),
    };

    let report = pipeline::run_trend_with(&client, sink.as_ref(), &config, &request, pipeline::now_unix())?;

    println!("{}", crate::report::format_trend_summary(&report, &args.game_type));
    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_series_plot(&report.series, args.width, args.height)
        );
    }
    Ok(())
}

fn handle_search(config: &TrendConfig, args: SearchArgs) -> Result<(), AppError> {
    let client = Aoe4WorldClient::from_config(config)?;
    let players = crate::search::search_recent(&client, &args.query, args.page.max(1), Utc::now())?;
    print!("{}", crate::report::format_players(&players));
    Ok(())
}

pub fn apply_serve_overrides(config: TrendConfig, args: &ServeArgs) -> TrendConfig {
    TrendConfig {
        bind_addr: args.bind.clone().unwrap_or_else(|| config.bind_addr.clone()),
        max_pages: override_max_pages(config.max_pages, args.max_pages),
        strict_dump: config.strict_dump || args.strict_dump,
        ..config
    }
}

/// `Some(0)` from the command line lifts the bound entirely.
fn override_max_pages(current: Option<u32>, flag: Option<u32>) -> Option<u32> {
    match flag {
        None => current,
        Some(0) => None,
        Some(n) => Some(n),
    }
}

/// Console plus append-only `log.txt` in the data directory.
///
/// Constructed once here; library code only uses `tracing` macros.
fn init_tracing(config: &TrendConfig, to_stdout: bool) -> Result<WorkerGuard, AppError> {
    std::fs::create_dir_all(&config.data_dir).map_err(|e| {
        AppError::config(format!(
            "Failed to create data dir '{}': {e}",
            config.data_dir.display()
        ))
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("log")
        .filename_suffix("txt")
        .build(&config.data_dir)
        .map_err(|e| AppError::config(format!("Failed to open {}: {e}", config.log_path().display())))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console = if to_stdout {
        BoxMakeWriter::new(std::io::stdout)
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(console))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| AppError::config(format!("Failed to initialize logging: {e}")))?;

    Ok(guard)
}

/// Rewrite argv so `trend` defaults to `trend serve`.
///
/// Rules:
/// - `trend`                       -> `trend serve`
/// - `trend --bind 0.0.0.0:80 ...` -> `trend serve --bind 0.0.0.0:80 ...`
/// - `trend --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("serve".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "serve" | "fetch" | "search");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "serve flags".
    if arg1.starts_with('-') {
        argv.insert(1, "serve".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
