//! Shared domain types.
//!
//! These are the values that flow between the fetcher, the normalizer and the
//! HTTP layer:
//!
//! - raw per-match observations (`Observation`)
//! - the ladder filter derived from the caller's selector (`GameTypeFilter`)
//! - the normalized output (`SeriesPair`, `TrendReport`, `TrendResponse`)
//! - player search records (`PlayerSummary`)

use serde::{Deserialize, Deserializer, Serialize};

/// Ladder selector that maps to the solo queue. Anything else means team queues.
pub const SOLO_LADDER: &str = "rm_solo";

/// Decode JSON `null` the same as an absent field. Pair with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One (timestamp, rating) pair taken from a single match appearance.
///
/// Keeps the field names of the original dump format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Match start, Unix seconds.
    #[serde(rename = "Date")]
    pub timestamp: f64,
    /// Rating after the match. `0.0` means none was recorded.
    #[serde(rename = "Rating")]
    pub rating: f64,
}

impl Observation {
    pub fn new(timestamp: f64, rating: f64) -> Self {
        Self { timestamp, rating }
    }

    pub fn is_unrated(&self) -> bool {
        self.rating == 0.0
    }
}

/// Match kinds accepted for a ladder selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTypeFilter {
    /// `rm_1v1` only.
    Solo,
    /// `rm_2v2`, `rm_3v3`, `rm_4v4`.
    Team,
}

impl GameTypeFilter {
    const SOLO_KINDS: &'static [&'static str] = &["rm_1v1"];
    const TEAM_KINDS: &'static [&'static str] = &["rm_2v2", "rm_3v3", "rm_4v4"];

    pub fn from_selector(selector: &str) -> Self {
        if selector == SOLO_LADDER {
            GameTypeFilter::Solo
        } else {
            GameTypeFilter::Team
        }
    }

    pub fn kinds(self) -> &'static [&'static str] {
        match self {
            GameTypeFilter::Solo => Self::SOLO_KINDS,
            GameTypeFilter::Team => Self::TEAM_KINDS,
        }
    }

    pub fn accepts(self, kind: &str) -> bool {
        self.kinds().contains(&kind)
    }
}

/// Index-aligned dates and ratings, ready for charting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPair {
    pub dates: Vec<f64>,
    pub ratings: Vec<f64>,
}

impl SeriesPair {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let (dates, ratings) = observations
            .iter()
            .map(|o| (o.timestamp, o.rating))
            .unzip();
        Self { dates, ratings }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn last_rating(&self) -> Option<f64> {
        self.ratings.last().copied()
    }

    pub fn push(&mut self, date: f64, rating: f64) {
        self.dates.push(date);
        self.ratings.push(rating);
    }
}

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendRequest {
    pub player_id: i64,
    /// Upstream leaderboard name, also used to derive the [`GameTypeFilter`].
    pub game_type: String,
}

/// Pipeline output for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub player_id: i64,
    /// Last display name seen across the fetched pages (empty when the player
    /// never appeared in an accepted match).
    pub player_name: String,
    pub series: SeriesPair,
    /// Observations collected before normalization.
    pub raw_count: usize,
}

/// JSON body of `GET /get_player_data`.
///
/// The trend-line fields are part of the contract with the chart frontend but
/// are always zero here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResponse {
    pub dates: Vec<f64>,
    pub ratings: Vec<f64>,
    pub min_date: f64,
    pub y1: f64,
    pub y2: f64,
    pub x2: f64,
    pub slope: f64,
    pub intercept: f64,
    pub player_name: String,
    pub player_id: i64,
}

impl From<TrendReport> for TrendResponse {
    fn from(report: TrendReport) -> Self {
        Self {
            dates: report.series.dates,
            ratings: report.series.ratings,
            min_date: 0.0,
            y1: 0.0,
            y2: 0.0,
            x2: 0.0,
            slope: 0.0,
            intercept: 0.0,
            player_name: report.player_name,
            player_id: report.player_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderRating {
    /// `0` when the player has no rating on that ladder.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboards {
    #[serde(default)]
    pub rm_team: LadderRating,
    #[serde(default)]
    pub rm_solo: LadderRating,
}

/// A player search hit, passed through to the frontend unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub profile_id: i64,
    /// RFC 3339 timestamp of the player's most recent match.
    #[serde(default)]
    pub last_game_at: String,
    #[serde(default)]
    pub leaderboards: Leaderboards,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_selector_maps_to_1v1_only() {
        let filter = GameTypeFilter::from_selector("rm_solo");
        assert_eq!(filter, GameTypeFilter::Solo);
        assert!(filter.accepts("rm_1v1"));
        assert!(!filter.accepts("rm_2v2"));
        assert!(!filter.accepts("rm_4v4"));
    }

    #[test]
    fn any_other_selector_maps_to_team_kinds() {
        for selector in ["rm_team", "rm_2v2", "", "qm_1v1"] {
            let filter = GameTypeFilter::from_selector(selector);
            assert_eq!(filter, GameTypeFilter::Team, "selector {selector:?}");
            assert!(!filter.accepts("rm_1v1"));
            assert!(filter.accepts("rm_2v2"));
            assert!(filter.accepts("rm_3v3"));
            assert!(filter.accepts("rm_4v4"));
            assert!(!filter.accepts("qm_2v2"));
        }
    }

    #[test]
    fn observation_dump_uses_legacy_field_names() {
        let json = serde_json::to_string(&Observation::new(1_700_000_000.0, 1234.0)).unwrap();
        assert_eq!(json, r#"{"Date":1700000000.0,"Rating":1234.0}"#);
    }

    #[test]
    fn response_zeroes_trend_fields() {
        let report = TrendReport {
            player_id: 7,
            player_name: "Beastyqt".to_string(),
            series: SeriesPair {
                dates: vec![1.0, 2.0],
                ratings: vec![1500.0, 1500.0],
            },
            raw_count: 1,
        };
        let resp = TrendResponse::from(report);
        assert_eq!(resp.dates, vec![1.0, 2.0]);
        assert_eq!(resp.slope, 0.0);
        assert_eq!(resp.intercept, 0.0);
        assert_eq!(resp.min_date, 0.0);
        assert_eq!(resp.player_id, 7);
    }

    #[test]
    fn player_summary_tolerates_missing_leaderboards() {
        let hit: PlayerSummary = serde_json::from_str(
            r#"{"name":"x","profile_id":3,"last_game_at":"2026-09-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(hit.leaderboards, Leaderboards::default());
    }

    #[test]
    fn unrated_ladder_is_served_as_zero() {
        let hit: PlayerSummary = serde_json::from_str(
            r#"{"name":"x","profile_id":3,"leaderboards":{"rm_solo":{"rating":null},"rm_team":{"rating":1320}}}"#,
        )
        .unwrap();
        assert_eq!(hit.leaderboards.rm_solo.rating, 0);
        assert_eq!(hit.leaderboards.rm_team.rating, 1320);

        let json = serde_json::to_value(&hit.leaderboards).unwrap();
        assert_eq!(json["rm_solo"]["rating"], 0);
    }
}
