//! aoe4world API integration: match history pages and player search.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{PlayerSummary, TrendConfig, null_as_default};
use crate::error::AppError;

pub const SEARCH_LIMIT: u32 = 10;

/// One page of a player's match history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GamesPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub games: Vec<MatchRecord>,
}

impl GamesPage {
    /// A page with fewer results than its page size is the last one.
    pub fn is_short(&self) -> bool {
        self.count < self.per_page
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRecord {
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub season: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teams: Vec<Vec<TeamSlot>>,
}

impl MatchRecord {
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.teams.iter().flatten().map(|slot| &slot.player)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSlot {
    pub player: Participant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    /// `0` when upstream omits it; never matches a requested player.
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Missing and `null` both mean "no rating recorded".
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub civilization: Option<String>,
    #[serde(default)]
    pub mmr: Option<f64>,
}

impl Participant {
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

/// Parameters of one match-history page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamesQuery<'a> {
    pub profile_id: i64,
    pub leaderboard: &'a str,
    /// 1-indexed.
    pub page: u32,
    pub since: DateTime<Utc>,
}

/// Paged access to a player's match history.
pub trait MatchSource: Send + Sync {
    fn games_page(&self, query: &GamesQuery<'_>) -> Result<GamesPage, AppError>;
}

/// Raw player search (no recency filtering).
pub trait PlayerDirectory: Send + Sync {
    fn search_players(&self, query: &str, page: u32) -> Result<Vec<PlayerSummary>, AppError>;
}

pub struct Aoe4WorldClient {
    client: Client,
    base_url: String,
}

impl Aoe4WorldClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ladder-trend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &TrendConfig) -> Result<Self, AppError> {
        Self::new(config.base_url.clone(), config.upstream_timeout)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T, AppError> {
        tracing::debug!(url, ?query, "upstream request");

        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| AppError::upstream(format!("Request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::upstream(format!(
                "Request to {url} failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::upstream(format!("Failed to parse response from {url}: {e}")))
    }
}

impl MatchSource for Aoe4WorldClient {
    fn games_page(&self, query: &GamesQuery<'_>) -> Result<GamesPage, AppError> {
        let url = format!("{}/players/{}/games", self.base_url, query.profile_id);
        self.get_json(
            &url,
            &[
                ("leaderboard", query.leaderboard.to_string()),
                ("page", query.page.to_string()),
                ("since", format_since(query.since)),
            ],
        )
    }
}

impl PlayerDirectory for Aoe4WorldClient {
    fn search_players(&self, query: &str, page: u32) -> Result<Vec<PlayerSummary>, AppError> {
        let url = format!("{}/players/search", self.base_url);
        let body: SearchResponse = self.get_json(
            &url,
            &[
                ("query", query.to_string()),
                ("page", page.to_string()),
                ("limit", SEARCH_LIMIT.to_string()),
            ],
        )?;
        Ok(body.players)
    }
}

/// Render a `since` bound the way the API documents it (`2024-03-19T00:00:00.000Z`).
pub fn format_since(since: DateTime<Utc>) -> String {
    since.to_rfc3339_opts(SecondsFormat::Millis, true)
}
