use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::entities::Activity;

const MILLIS_IN_HOUR: f64 = 3_600_000.;

/// Read-only summary of the time spent on an activity. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub name: String,
    pub total_hours_spent: f64,
    pub total_spent_formatted: String,
    pub is_active: bool,
    pub active_since: Option<DateTime<Utc>>,
}

/// Sums all sessions of `activity`. An open session counts up to `now`.
pub fn compute_stats(activity: &Activity, now: DateTime<Utc>) -> ActivityStats {
    let mut total = Duration::zero();
    let mut active_since = None;

    for session in &activity.sessions {
        let end = match session.ended_at {
            Some(end) => end,
            None => {
                active_since = Some(session.started_at);
                now
            }
        };
        // Zero-length contribution for corrupted intervals or a clock that went backwards.
        total += (end - session.started_at).max(Duration::zero());
    }

    ActivityStats {
        name: activity.name.clone(),
        total_hours_spent: total.num_milliseconds() as f64 / MILLIS_IN_HOUR,
        total_spent_formatted: format_duration(total),
        is_active: active_since.is_some(),
        active_since,
    }
}

/// Formats a duration as `HHh MMm SSs`. Hours are not capped, so 120 hours print as `120h`.
pub fn format_duration(v: Duration) -> String {
    format!(
        "{:02}h {:02}m {:02}s",
        v.num_hours(),
        v.num_minutes() % 60,
        v.num_seconds() % 60
    )
}
