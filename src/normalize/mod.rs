//! Rating-series normalization.
//!
//! Four ordered steps turn the raw observations into a chartable series:
//!
//! 1. sort by timestamp
//! 2. drop the first [`WARMUP_ZEROS`] unrated observations of the season
//! 3. repair the remaining unrated observations from their neighbours
//! 4. append a synthetic point at `now` carrying the last rating
//!
//! Early-season zeros are games abandoned before a rating was assigned. Later
//! zeros are rare and kept, but get a neighbouring rating so the chart does not
//! dip to the axis.

use crate::domain::{Observation, SeriesPair};
use crate::error::AppError;

/// Number of unrated observations dropped at the start of a season.
pub const WARMUP_ZEROS: usize = 5;

/// Run the full normalization. `now` is the Unix time of the synthetic point.
pub fn normalize(mut observations: Vec<Observation>, now: f64) -> Result<SeriesPair, AppError> {
    sort_by_time(&mut observations);
    let mut kept = drop_warmup_zeros(observations);
    repair_zero_ratings(&mut kept);

    let mut series = SeriesPair::from_observations(&kept);
    append_current_point(&mut series, now)?;
    Ok(series)
}

/// Ascending by timestamp. Ties keep no particular order.
pub fn sort_by_time(observations: &mut [Observation]) {
    observations.sort_unstable_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
}

/// Drop the first [`WARMUP_ZEROS`] unrated observations; everything else stays.
pub fn drop_warmup_zeros(observations: Vec<Observation>) -> Vec<Observation> {
    let mut zeros_seen = 0usize;
    observations
        .into_iter()
        .filter(|o| {
            if !o.is_unrated() {
                return true;
            }
            zeros_seen += 1;
            zeros_seen > WARMUP_ZEROS
        })
        .collect()
}

/// Replace each zero rating with the nearest earlier non-zero rating, or the
/// nearest later one when nothing earlier is rated. An all-zero series is left
/// untouched.
pub fn repair_zero_ratings(observations: &mut [Observation]) {
    let Some(first_rated) = observations.iter().map(|o| o.rating).find(|&r| r != 0.0) else {
        return;
    };

    // Leading zeros take the first rating; later ones carry the last rating forward.
    let mut last_rated = first_rated;
    for o in observations.iter_mut() {
        if o.is_unrated() {
            o.rating = last_rated;
        } else {
            last_rated = o.rating;
        }
    }
}

/// Append `(now, last rating)`. Fails with `NotFound` on an empty series.
pub fn append_current_point(series: &mut SeriesPair, now: f64) -> Result<(), AppError> {
    let last = series
        .last_rating()
        .ok_or_else(|| AppError::not_found("No data available"))?;
    series.push(now, last);
    Ok(())
}
