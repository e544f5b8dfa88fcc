//! Formatted terminal output for the CLI commands.
//!
//! Formatting lives here so the pipeline stays presentation-free and output
//! changes stay localized.

use crate::domain::{PlayerSummary, TrendReport};
use crate::plot::ascii::format_day;

/// Summary block for `trend fetch`.
pub fn format_trend_summary(report: &TrendReport, game_type: &str) -> String {
    let series = &report.series;
    let mut out = String::new();

    out.push_str("=== trend - ladder rating series ===\n");
    let name = if report.player_name.is_empty() {
        "<unknown>"
    } else {
        report.player_name.as_str()
    };
    out.push_str(&format!("Player: {name} ({})\n", report.player_id));
    out.push_str(&format!("Ladder: {game_type}\n"));
    out.push_str(&format!(
        "Observations: raw={} | charted={} (incl. current point)\n",
        report.raw_count,
        series.len()
    ));

    if let (Some(first), Some(last)) = (series.dates.first(), series.dates.last()) {
        out.push_str(&format!("Dates: {} .. {}\n", format_day(*first), format_day(*last)));
    }

    let min = series.ratings.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if let (Some(first), Some(last)) = (series.ratings.first(), series.last_rating()) {
        out.push_str(&format!(
            "Rating: first={first:.0} | current={last:.0} | min={min:.0} | max={max:.0}\n"
        ));
    }

    out
}

/// Table for `trend search`.
pub fn format_players(players: &[PlayerSummary]) -> String {
    if players.is_empty() {
        return "No recently active players found.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:<24} {:>8} {:>8}  {}\n",
        "profile_id", "name", "solo", "team", "last_game_at"
    ));
    for p in players {
        out.push_str(&format!(
            "{:<12} {:<24} {:>8} {:>8}  {}\n",
            p.profile_id,
            p.name,
            fmt_rating(p.leaderboards.rm_solo.rating),
            fmt_rating(p.leaderboards.rm_team.rating),
            p.last_game_at
        ));
    }
    out
}

fn fmt_rating(rating: i64) -> String {
    if rating == 0 {
        "-".to_string()
    } else {
        rating.to_string()
    }
}
