//! Match-history pagination and per-player observation extraction.
//!
//! The loop trusts upstream paging (`count < per_page` marks the last page)
//! and is additionally bounded by `max_pages`. Without that bound, a
//! misbehaving upstream that keeps returning full pages would never stop; the
//! per-request timeout on the client does not cover the loop as a whole.

use chrono::{DateTime, Utc};

use crate::data::{GamesPage, GamesQuery, MatchSource};
use crate::domain::{GameTypeFilter, Observation, TrendRequest};
use crate::error::AppError;

/// Raw fetch result, before sorting or zero handling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    /// Display name from the last accepted match the player appeared in.
    pub player_name: String,
    /// Observations in arrival order.
    pub observations: Vec<Observation>,
    pub pages_fetched: u32,
    /// `true` when `max_pages` cut the loop short.
    pub truncated: bool,
}

/// Convert the configured season start into the `since` bound sent upstream.
pub fn season_since(season_start: f64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp(season_start.floor() as i64, 0)
        .ok_or_else(|| AppError::config(format!("Season start {season_start} is out of range")))
}

#[tracing::instrument(
    name = "fetch_observations",
    skip(source),
    fields(player_id = request.player_id, game_type = %request.game_type),
)]
pub fn fetch_observations(
    source: &dyn MatchSource,
    request: &TrendRequest,
    season_start: f64,
    max_pages: Option<u32>,
) -> Result<FetchOutcome, AppError> {
    let filter = GameTypeFilter::from_selector(&request.game_type);
    let since = season_since(season_start)?;
    let mut outcome = FetchOutcome::default();
    let mut page = 1u32;

    loop {
        if max_pages.is_some_and(|limit| page > limit) {
            tracing::warn!(max_pages = ?max_pages, "page limit reached, stopping early");
            outcome.truncated = true;
            break;
        }

        let resp = source.games_page(&GamesQuery {
            profile_id: request.player_id,
            leaderboard: &request.game_type,
            page,
            since,
        })?;
        outcome.pages_fetched = page;
        tracing::info!(page, count = resp.count, per_page = resp.per_page, games = resp.games.len(), "fetched page");

        if resp.games.is_empty() {
            tracing::info!(page, "no more games");
            break;
        }

        collect_page(&resp, request.player_id, filter, season_start, &mut outcome);

        if resp.is_short() {
            tracing::info!(page, "short page, stopping");
            break;
        }
        page += 1;
    }

    tracing::info!(
        observations = outcome.observations.len(),
        player_name = %outcome.player_name,
        "fetch complete"
    );
    Ok(outcome)
}

fn collect_page(
    resp: &GamesPage,
    player_id: i64,
    filter: GameTypeFilter,
    season_start: f64,
    outcome: &mut FetchOutcome,
) {
    for game in &resp.games {
        if !filter.accepts(&game.kind) {
            continue;
        }
        let started = game.started_at.timestamp() as f64;
        for player in game.participants().filter(|p| p.profile_id == player_id) {
            outcome.player_name.clone_from(&player.name);
            if started < season_start {
                continue;
            }
            outcome
                .observations
                .push(Observation::new(started, player.rating_or_zero()));
        }
    }
}
