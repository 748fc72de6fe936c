use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Rendering used for timestamps, e.g. `3/1/2024, 9:30:00 AM`
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Layout of the naive timestamps produced by the services (`isoformat()` output)
const NAIVE_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format seconds since the epoch in the given timezone.
/// Returns None for values that are not a representable instant.
pub fn format_timestamp<Tz>(epoch_secs: f64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if !epoch_secs.is_finite() {
        return None;
    }
    let millis = (epoch_secs * 1000.0).round() as i64;
    let utc = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string())
}

/// Format seconds since the epoch in the local timezone
pub fn format_local_timestamp(epoch_secs: f64) -> Option<String> {
    format_timestamp(epoch_secs, &Local)
}

/// Format a record's `created_at` for display in local time.
/// Naive timestamps are UTC; unparsable input is returned unchanged.
pub fn format_created_at(raw: &str) -> String {
    format_created_at_in(raw, &Local)
}

fn format_created_at_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, NAIVE_ISO_FORMAT).map(|n| n.and_utc()));

    match parsed {
        Ok(dt) => dt.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Format a price with two decimals, e.g. `$4.50`
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
