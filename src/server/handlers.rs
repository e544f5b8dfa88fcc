use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;

use super::AppState;
use crate::app::pipeline::{now_unix, run_trend_with};
use crate::domain::{PlayerSummary, TrendRequest, TrendResponse};
use crate::error::AppError;
use crate::search::search_recent;

type Params = HashMap<String, String>;

/// `GET /get_player_data?playerID=<int>&gameType=<string>&predictionLimit=<int>`
pub async fn player_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<Json<TrendResponse>, AppError> {
    let request = parse_trend_params(&params)?;
    tracing::info!(player_id = request.player_id, game_type = %request.game_type, "trend request");

    let report = run_blocking(move || {
        run_trend_with(
            state.matches.as_ref(),
            state.sink.as_ref(),
            &state.config,
            &request,
            now_unix(),
        )
    })
    .await?;

    Ok(Json(report.into()))
}

/// `GET /find_player?query=<string>&page=<int>`
pub async fn find_player(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let query = required(&params, "query")?.to_string();
    let page = match params.get("page").map(String::as_str).filter(|v| !v.is_empty()) {
        None => 1,
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|&p| p >= 1)
            .ok_or_else(|| AppError::validation(format!("Invalid page '{raw}'")))?,
    };

    let players = run_blocking(move || search_recent(state.players.as_ref(), &query, page, Utc::now())).await?;
    Ok(Json(players))
}

pub fn parse_trend_params(params: &Params) -> Result<TrendRequest, AppError> {
    let raw_id = required(params, "playerID")?;
    let game_type = required(params, "gameType")?;
    let raw_limit = required(params, "predictionLimit")?;

    let player_id = raw_id
        .parse::<i64>()
        .map_err(|e| AppError::validation(format!("Invalid playerID '{raw_id}': {e}")))?;
    // Accepted for frontend compatibility; it does not change the computation.
    raw_limit
        .parse::<i64>()
        .map_err(|e| AppError::validation(format!("Invalid predictionLimit '{raw_limit}': {e}")))?;

    Ok(TrendRequest {
        player_id,
        game_type: game_type.to_string(),
    })
}

fn required<'a>(params: &'a Params, key: &str) -> Result<&'a str, AppError> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("Url Param '{key}' is missing")))
}

async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::internal(format!("Request worker failed: {e}")))?
}
