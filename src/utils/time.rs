use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// This is the standard way of showing a moment to the user in kal, e.g. `04 Jul 18 09:30 +02:00`.
pub fn format_moment<Tz: TimeZone>(moment: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    moment.format("%d %b %y %H:%M %Z").to_string()
}
