//! Duration formatting for embedded episode titles
//!
//! Titles carry the episode length as `(mm:ss)`. Minutes are not wrapped
//! into hours, so a two hour show reads `(120:00)`.

/// Format a duration in seconds as `mm:ss`
///
/// Seconds are rounded half-to-even, and the rounding is applied after the
/// minute split, so `59.5` seconds past a minute boundary reads `:60`
/// rather than carrying into the next minute. Existing archives were
/// titled this way.
///
/// # Examples
///
/// ```
/// use rbtag_common::human_time::format_minutes_seconds;
///
/// assert_eq!(format_minutes_seconds(2712.4), "45:12");
/// assert_eq!(format_minutes_seconds(7200.0), "120:00");
/// ```
pub fn format_minutes_seconds(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let rest = (seconds % 60.0).round_ties_even() as u64;
    format!("{:02}:{:02}", minutes, rest)
}

/// Format a duration as the parenthesized title token, e.g. `(45:12)`
pub fn format_title_duration(seconds: f64) -> String {
    format!("({})", format_minutes_seconds(seconds))
}
