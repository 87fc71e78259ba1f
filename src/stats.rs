//! Statistics derived from raw listening data.
//!
//! These are pure functions over already-fetched API data; fetching and
//! fallback behavior live in [`crate::management::ReceiptLoader`].

use std::collections::HashMap;

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};

use crate::types::{Artist, DayTime, GenreShare, TimeRange};

/// Genres listed on a receipt.
pub const TOP_GENRES: usize = 5;

/// Assumed length of one play, in minutes, for listening-time estimates.
pub const AVERAGE_TRACK_MINUTES: f64 = 3.5;

/// The period of the day with the most plays, in the local time zone.
///
/// Returns `None` for an empty history.
pub fn favorite_day_time(played_at: &[DateTime<Utc>], range: TimeRange) -> Option<DayTime> {
    favorite_day_time_in(played_at, range, &Local)
}

/// [`favorite_day_time`] with an explicit time zone.
///
/// Each bucket count is scaled by the range multiplier before the argmax.
/// Scaling all buckets by the same factor cannot change the winner; the
/// weighting is kept so the figures match the other range-scaled stats.
/// Ties go to the earliest bucket in Morning, Afternoon, Evening, Night order.
pub fn favorite_day_time_in<Tz: TimeZone>(
    played_at: &[DateTime<Utc>],
    range: TimeRange,
    tz: &Tz,
) -> Option<DayTime> {
    if played_at.is_empty() {
        return None;
    }

    let mut counts = [0u64; 4];
    for at in played_at {
        let hour = at.with_timezone(tz).hour();
        counts[DayTime::from_hour(hour).slot()] += 1;
    }

    let multiplier = range.multiplier();
    for count in counts.iter_mut() {
        *count *= multiplier;
    }

    let mut best = DayTime::ALL[0];
    for slot in DayTime::ALL.into_iter().skip(1) {
        if counts[slot.slot()] > counts[best.slot()] {
            best = slot;
        }
    }
    Some(best)
}

/// Estimated minutes listened over `range`.
///
/// This is an extrapolation, not a sum: `floor(play_count * 3.5)` scaled by the
/// range multiplier. The recently-played sample is capped at 50 plays and
/// track durations are ignored, so treat the result as a rough figure.
pub fn total_minutes(play_count: usize, range: TimeRange) -> u64 {
    let base = (play_count as f64 * AVERAGE_TRACK_MINUTES).floor() as u64;
    base * range.multiplier()
}

/// Share of each genre tag across `artists`, highest first, at most `top_n`.
///
/// Percentages are rounded independently and need not sum to 100. Equal
/// percentages keep the order in which the genres were first seen.
pub fn genre_distribution(artists: &[Artist], top_n: usize) -> Vec<GenreShare> {
    let mut order: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total = 0u64;

    for genre in artists.iter().flat_map(|a| a.genres.iter()) {
        total += 1;
        match index.get(genre.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(genre.as_str(), order.len());
                order.push((genre.as_str(), 1));
            }
        }
    }

    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<GenreShare> = order
        .into_iter()
        .map(|(name, count)| GenreShare {
            name: name.to_string(),
            percentage: ((count as f64 / total as f64) * 100.0).round() as u8,
        })
        .collect();

    // stable sort keeps first-seen order among equal percentages
    shares.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    shares.truncate(top_n);
    shares
}
