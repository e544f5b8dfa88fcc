//! Player search: one upstream call, filtered to recently active players.

use chrono::{DateTime, Months, Utc};

use crate::data::PlayerDirectory;
use crate::domain::PlayerSummary;
use crate::error::AppError;

/// Players whose last match is older than this are hidden.
pub const RECENT_MONTHS: u32 = 3;

pub fn search_recent(
    directory: &dyn PlayerDirectory,
    query: &str,
    page: u32,
    now: DateTime<Utc>,
) -> Result<Vec<PlayerSummary>, AppError> {
    let players = directory.search_players(query, page)?;
    let total = players.len();
    let recent = recent_players(players, now)?;
    tracing::info!(query, page, total, recent = recent.len(), "player search");
    Ok(recent)
}

/// Keep players active within the last [`RECENT_MONTHS`] months.
///
/// One unparsable `last_game_at` fails the whole batch.
pub fn recent_players(players: Vec<PlayerSummary>, now: DateTime<Utc>) -> Result<Vec<PlayerSummary>, AppError> {
    let cutoff = now
        .checked_sub_months(Months::new(RECENT_MONTHS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut out = Vec::with_capacity(players.len());
    for player in players {
        let last_game = DateTime::parse_from_rfc3339(&player.last_game_at).map_err(|e| {
            AppError::upstream(format!(
                "Invalid last_game_at '{}' for player {}: {e}",
                player.last_game_at, player.profile_id
            ))
        })?;
        if last_game.with_timezone(&Utc) > cutoff {
            out.push(player);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::Leaderboards;

    fn player(id: i64, last_game_at: &str) -> PlayerSummary {
        PlayerSummary {
            name: format!("p{id}"),
            profile_id: id,
            last_game_at: last_game_at.to_string(),
            leaderboards: Leaderboards::default(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
    }

    struct FixedDirectory(Vec<PlayerSummary>);

    impl PlayerDirectory for FixedDirectory {
        fn search_players(&self, _query: &str, _page: u32) -> Result<Vec<PlayerSummary>, AppError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn keeps_only_players_active_in_last_three_months() {
        let players = vec![
            player(1, "2026-10-01T08:00:00.000Z"),
            player(2, "2026-07-14T12:00:00Z"),
            player(3, "2026-07-14T12:00:01+00:00"),
            player(4, "2025-01-01T00:00:00Z"),
        ];
        let ids: Vec<i64> = recent_players(players, now())
            .unwrap()
            .iter()
            .map(|p| p.profile_id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn one_bad_timestamp_aborts_everything() {
        let players = vec![player(1, "2026-10-01T08:00:00Z"), player(2, "yesterday")];
        let err = recent_players(players, now()).unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref m) if m.contains("yesterday")));
    }

    #[test]
    fn search_recent_filters_directory_results() {
        let dir = FixedDirectory(vec![player(1, "2026-10-13T00:00:00Z"), player(2, "2024-10-13T00:00:00Z")]);
        let hits = search_recent(&dir, "p", 1, now()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].profile_id, 1);
    }
}
