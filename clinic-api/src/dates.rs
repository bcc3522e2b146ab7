//! Date handling at the API boundary.
//!
//! The API expects ISO-8601 instants. Form inputs arrive as `YYYY-MM-DD` or
//! `YYYY-MM-DDTHH:MM` and mean wall-clock time where the user sits (the
//! browser's zone on wasm). Timestamps the API sends without an offset are UTC.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Normalizes a form date/time to an ISO instant, reading offset-less input
/// as local time.
///
/// Blank input gives `None`. Input that cannot be read as a date is passed
/// through unchanged so the API can report it.
pub fn to_iso(input: &str) -> Option<String> {
    to_iso_in(input, &Local)
}

/// [`to_iso`] with an explicit zone for offset-less input.
pub fn to_iso_in<Tz: TimeZone>(input: &str, zone: &Tz) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    match parse_form_datetime(trimmed, zone) {
        Some(instant) => Some(format_iso(instant)),
        None => Some(input.to_string()),
    }
}

/// Reads form input. Offset-less values are wall-clock time in `zone`; a bare
/// date is midnight there. A time skipped by a DST jump moves one hour ahead.
pub fn parse_form_datetime<Tz: TimeZone>(value: &str, zone: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    let naive = parse_naive(value)?;
    zone.from_local_datetime(&naive)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|instant| instant.with_timezone(&Utc))
}

/// Reads an API timestamp: RFC 3339, or offset-less ISO taken as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    parse_naive(value).map(|naive| naive.and_utc())
}

pub fn format_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
