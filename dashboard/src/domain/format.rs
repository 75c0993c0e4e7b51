//! Display formatting for timestamps and names.

use chrono::{DateTime, Utc};

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1_440;

/// Coarse age of `then` relative to `now`: `Just now`, `5m ago`, `3h ago`
/// or `2d ago`.
///
/// Future timestamps read as `Just now`.
///
/// # Examples
/// ```
/// use chrono::{TimeDelta, Utc};
/// use dashboard::domain::relative_time;
///
/// let now = Utc::now();
/// assert_eq!(relative_time(now - TimeDelta::minutes(90), now), "1h ago");
/// ```
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(then).num_minutes();
    if minutes < 1 {
        "Just now".to_owned()
    } else if minutes < MINUTES_PER_HOUR {
        format!("{minutes}m ago")
    } else if minutes < MINUTES_PER_DAY {
        format!("{}h ago", minutes / MINUTES_PER_HOUR)
    } else {
        format!("{}d ago", minutes / MINUTES_PER_DAY)
    }
}

/// Up to two uppercase initials, one per space-separated word.
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}
