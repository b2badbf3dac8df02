//! Recency scoring: exponential decay of a publication/update date.
//!
//! Activity within the grace window scores a full 1.00; older activity
//! decays exponentially rather than falling off a cliff, so a normal
//! publication gap does not zero a supervisor out.

use chrono::{Datelike, NaiveDate, Utc};

/// Years of recent activity that still score 1.00.
pub const FULL_SCORE_WINDOW_YEARS: f64 = 3.0;

/// Decay rate applied beyond the grace window.
pub const DECAY_RATE: f64 = 0.25;

/// Earliest plausible year; anything before this is treated as garbage.
const MIN_YEAR: i32 = 1900;

/// Parse a possibly partial date string.
///
/// Accepts `YYYY-MM-DD` or a bare/leading year (`"2021"`, `"2021-xx"`),
/// which defaults to January 1. Returns `None` for blanks, `"n/a"`,
/// unparseable input, or years outside `[1900, current_year + 1]`.
pub fn parse_partial_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("n/a") {
        return None;
    }

    let date = if let Ok(full) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        full
    } else {
        let year: i32 = raw.split('-').next()?.trim().parse().ok()?;
        NaiveDate::from_ymd_opt(year, 1, 1)?
    };

    if date.year() < MIN_YEAR || date.year() > today.year() + 1 {
        return None;
    }
    Some(date)
}

/// Score recency against a fixed reference date (deterministic; tests use
/// this directly).
pub fn score_recency_at(last_relevant_date: Option<&str>, today: NaiveDate) -> f32 {
    let Some(date) = last_relevant_date.and_then(|raw| parse_partial_date(raw, today)) else {
        return 0.0;
    };

    let years_elapsed = (today - date).num_days() as f64 / 365.25;
    let score = if years_elapsed <= FULL_SCORE_WINDOW_YEARS {
        1.0
    } else {
        (-DECAY_RATE * (years_elapsed - FULL_SCORE_WINDOW_YEARS)).exp()
    };

    (round2(score).min(1.0)).max(0.0) as f32
}

/// Score recency against today's date.
pub fn score_recency(last_relevant_date: Option<&str>) -> f32 {
    score_recency_at(last_relevant_date, Utc::now().date_naive())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
