use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use tracing::warn;

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Naive layouts tried after RFC 3339, in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parse a sample timestamp into the wall-clock time it was recorded at.
///
/// No timezone conversion is ever applied: an RFC 3339 value such as
/// `2024-01-01T12:30:00+08:00` yields `12:30`, exactly what a reader of the
/// raw file sees. Date-only values resolve to midnight.
///
/// Returns `None` for empty strings or unrecognised formats.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalised = if let Some(stripped) = s.strip_suffix('Z') {
        format!("{}+00:00", stripped)
    } else {
        s.to_string()
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }

    if let Some(date) = parse_date(s) {
        return date.and_hms_opt(0, 0, 0);
    }

    warn!("could not parse timestamp \"{}\"", s);
    None
}

/// Parse a calendar date in `YYYY-MM-DD` (or `YYYY/MM/DD`) form.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}

/// Hour of day (0–23) taken verbatim from the naive timestamp.
pub fn hour_of_day(ts: &NaiveDateTime) -> u8 {
    // `hour()` is always < 24.
    ts.hour() as u8
}

// ── Tests ─────────────────────────────────────────────────────────────────────
