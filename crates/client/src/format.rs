//! Timestamp rendering for conversation and message lists

use chrono::{DateTime, Local, TimeZone, Utc};

const DISPLAY_FORMAT: &str = "%b %d, %I:%M %p";

/// Render a timestamp as e.g. `Jan 05, 03:04 PM` in the given zone.
pub fn format_timestamp_in<Tz>(timestamp: &DateTime<Utc>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(zone)
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// Render a timestamp in the local time zone.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    format_timestamp_in(timestamp, &Local)
}
