//! Shared "trend pipeline" logic used by both the HTTP server and the CLI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch pages -> raw dump -> normalize -> report
//!
//! The server and the CLI can then focus on presentation (JSON vs terminal).

use chrono::Utc;

use crate::data::MatchSource;
use crate::domain::{TrendConfig, TrendReport, TrendRequest};
use crate::error::AppError;
use crate::fetch::fetch_observations;
use crate::io::ObservationSink;
use crate::normalize::normalize;

/// Current wall-clock time in whole Unix seconds.
pub fn now_unix() -> f64 {
    Utc::now().timestamp() as f64
}

/// Execute the full pipeline with the given upstream and dump sink.
///
/// `now` becomes the timestamp of the synthetic final point.
pub fn run_trend_with(
    source: &dyn MatchSource,
    sink: &dyn ObservationSink,
    config: &TrendConfig,
    request: &TrendRequest,
    now: f64,
) -> Result<TrendReport, AppError> {
    // 1) Page through the match history.
    let fetched = fetch_observations(source, request, config.season_start, config.max_pages)?;
    let raw_count = fetched.observations.len();

    // 2) Dump raw observations (best effort unless strict).
    if let Err(err) = sink.record(&fetched.player_name, &fetched.observations) {
        if config.strict_dump {
            tracing::error!(error = %err, "raw dump failed");
            return Err(err.into());
        }
        tracing::warn!(error = %err, "raw dump failed, continuing");
    }

    // 3) Sort, drop/repair zeros, append the current point.
    let series = normalize(fetched.observations, now).inspect_err(|_| {
        tracing::info!(player_id = request.player_id, "no data after normalization");
    })?;

    tracing::info!(
        player_id = request.player_id,
        player_name = %fetched.player_name,
        raw_count,
        points = series.len(),
        "trend ready"
    );

    Ok(TrendReport {
        player_id: request.player_id,
        player_name: fetched.player_name,
        series,
        raw_count,
    })
}
