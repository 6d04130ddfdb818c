//! Turns tracker results into what gets printed, either plain text or tab indented JSON.

use std::fmt::{Display, Write};

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::{
    tracker::{entities::Activity, stats::ActivityStats},
    utils::{json::to_tab_indented_json, time::format_moment},
};

pub fn render_names(names: &[String], json: bool) -> Result<String> {
    if json {
        return render_json(names);
    }
    let mut out = String::new();
    for name in names {
        writeln!(out, "{name}")?;
    }
    Ok(out)
}

/// Stats of a single activity. JSON output is a single object.
pub fn render_stats<Tz: TimeZone>(stats: &ActivityStats, json: bool, timezone: &Tz) -> Result<String>
where
    Tz::Offset: Display,
{
    if json {
        return render_json(stats);
    }
    let mut out = String::new();
    write_stats_block(&mut out, stats, timezone)?;
    Ok(out)
}

/// Stats of every activity, text blocks separated by an empty line.
pub fn render_all_stats<Tz: TimeZone>(
    stats: &[ActivityStats],
    json: bool,
    timezone: &Tz,
) -> Result<String>
where
    Tz::Offset: Display,
{
    if json {
        return render_json(stats);
    }
    let mut out = String::new();
    for (i, entry) in stats.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_stats_block(&mut out, entry, timezone)?;
    }
    Ok(out)
}

/// Activities with a running session and the moment it was started.
pub fn render_open_activities<Tz: TimeZone>(
    activities: &[Activity],
    json: bool,
    timezone: &Tz,
) -> Result<String>
where
    Tz::Offset: Display,
{
    if json {
        return render_json(activities);
    }
    let mut out = String::new();
    for activity in activities {
        let Some(session) = activity.open_session() else {
            continue;
        };
        writeln!(out, "Activity: {}", activity.name)?;
        writeln!(
            out,
            "StartedAt: {}",
            local_moment(&session.started_at, timezone)
        )?;
    }
    Ok(out)
}

fn write_stats_block<Tz: TimeZone>(
    out: &mut String,
    stats: &ActivityStats,
    timezone: &Tz,
) -> std::fmt::Result
where
    Tz::Offset: Display,
{
    writeln!(out, "Activity: {}", stats.name)?;
    writeln!(
        out,
        "Total time spent (formatted): {}",
        stats.total_spent_formatted
    )?;
    writeln!(out, "Total time spent (hours): {:.6}", stats.total_hours_spent)?;
    if let Some(since) = stats.active_since.filter(|_| stats.is_active) {
        writeln!(
            out,
            "Active session since: {}",
            local_moment(&since, timezone)
        )?;
    }
    Ok(())
}

fn local_moment<Tz: TimeZone>(moment: &DateTime<Utc>, timezone: &Tz) -> String
where
    Tz::Offset: Display,
{
    format_moment(&moment.with_timezone(timezone))
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = String::from_utf8(to_tab_indented_json(value)?)?;
    out.push('\n');
    Ok(out)
}
