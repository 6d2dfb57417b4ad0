//! Time-of-day helpers.
//!
//! All planning times are whole seconds since midnight of the job's
//! production date. Absence of a time is `None`, never a sentinel value.
//!
//! # Parsing
//! Parsing never fails: an unparseable or empty string reads as midnight (0).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Seconds since midnight of a production date.
pub type Seconds = i64;

/// Default gap between an upstream finish and a dependent start (5 minutes).
pub const BUFFER_SECS: Seconds = 300;

/// Parses `H:MM`, `HH:MM` or `HH:MM:SS` into seconds since midnight.
///
/// Returns 0 for anything that does not parse.
///
/// # Examples
/// ```
/// use u_lineplan::models::parse_hhmm;
///
/// assert_eq!(parse_hhmm("09:30"), 34_200);
/// assert_eq!(parse_hhmm("9:30"), 34_200);
/// assert_eq!(parse_hhmm("garbage"), 0);
/// ```
pub fn parse_hhmm(text: &str) -> Seconds {
    try_parse_hhmm(text).unwrap_or(0)
}

/// Strict variant of [`parse_hhmm`], used by validation.
pub fn try_parse_hhmm(text: &str) -> Option<Seconds> {
    let text = text.trim();
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .map(|t| Seconds::from(t.num_seconds_from_midnight()))
}

/// Formats seconds since midnight as `HH:MM`.
///
/// Values past midnight keep counting hours (`25:10`) so next-day
/// finishes stay distinguishable.
pub fn format_hhmm(secs: Seconds) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let abs = secs.abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

/// Formats an optional time, rendering `--:--` when absent.
pub fn format_optional(secs: Option<Seconds>) -> String {
    secs.map(format_hhmm).unwrap_or_else(|| "--:--".to_string())
}

/// Converts a recorded timestamp to seconds relative to `date` midnight.
pub fn seconds_on(date: NaiveDate, at: NaiveDateTime) -> Seconds {
    at.date().signed_duration_since(date).num_days() * 86_400
        + Seconds::from(at.time().num_seconds_from_midnight())
}
