//! Date/time normalization.
//!
//! Turns the raw date and time attributes of an event into compact stamps:
//! a full-day event gets identical `YYYYMMDD` start and end stamps, a timed
//! event gets UTC `YYYYMMDDTHHMMSSZ` stamps plus a duration value.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::attributes::EventAttributes;
use crate::error::NormalizeError;
use crate::event::{EventTime, NormalizedEvent};

/// Date layouts accepted for start and end dates, besides RFC 3339 and
/// RFC 2822 date-times.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

/// Date-times without an offset; only their date is used.
const LOCAL_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// How the duration of a timed event is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationStyle {
    /// Minutes past the whole hours of the span, floored. Whole-hour spans
    /// have no value.
    #[default]
    Legacy,
    /// Zero-padded `HHMM`, always present.
    HoursMinutes,
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Zone the wall-clock start and end times are read in
    pub timezone: Tz,
    pub duration_style: DurationStyle,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            timezone: Tz::UTC,
            duration_style: DurationStyle::default(),
        }
    }
}

/// Outcome of a successful normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// The start date is missing or unparseable; the raw values are kept as-is.
    Unchanged,
    Dates(NormalizedEvent),
}

/// Normalize an event's dates.
///
/// - No parseable start date: [`Normalized::Unchanged`].
/// - A start time without an end date ends on the start date.
/// - No start time: a full-day event on the start date.
/// - A start time without an end time: [`NormalizeError::MissingTime`].
/// - Otherwise a timed event in `options.timezone`, converted to UTC.
pub fn normalize(
    attrs: &EventAttributes,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    let Some(start_raw) = present(&attrs.start_date) else {
        return Ok(Normalized::Unchanged);
    };
    let Some(start_date) = parse_date(start_raw, options.timezone) else {
        return Ok(Normalized::Unchanged);
    };

    let start_time = present(&attrs.start_time);
    let end_raw = match (present(&attrs.end_date), start_time) {
        (None, Some(_)) => Some(start_raw),
        (end, _) => end,
    };

    let Some(start_time) = start_time else {
        return Ok(Normalized::Dates(NormalizedEvent {
            start: EventTime::Date(start_date),
            end: EventTime::Date(start_date),
            duration: None,
        }));
    };

    let (Some(end_time), Some(end_raw)) = (present(&attrs.end_time), end_raw) else {
        return Err(NormalizeError::MissingTime);
    };

    let end_date = parse_date(end_raw, options.timezone)
        .ok_or_else(|| NormalizeError::InvalidDate(end_raw.to_string()))?;

    let start = combine(start_date, parse_time(start_time)?, options.timezone)?;
    let end = combine(end_date, parse_time(end_time)?, options.timezone)?;

    Ok(Normalized::Dates(NormalizedEvent {
        start: EventTime::DateTimeUtc(start),
        end: EventTime::DateTimeUtc(end),
        duration: duration_value(start, end, options.duration_style),
    }))
}

/// Render the span between two instants according to `style`.
pub fn duration_value(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    style: DurationStyle,
) -> Option<String> {
    let span = (end - start).abs();
    match style {
        DurationStyle::Legacy => legacy_minutes(span).map(|m| m.to_string()),
        DurationStyle::HoursMinutes => {
            let minutes = span.num_minutes();
            Some(format!("{:02}{:02}", minutes / 60, minutes % 60))
        }
    }
}

/// Fractional hours are printed in their shortest decimal form and the digits
/// after the point are read back as a fraction of an hour. Floating-point
/// error is kept: 1h20m is `1.3333333333333333` hours and yields 19.
fn legacy_minutes(span: TimeDelta) -> Option<u32> {
    let hours = span.num_milliseconds() as f64 / 3_600_000.0;
    let rendered = hours.to_string();
    let (_, fraction) = rendered.split_once('.')?;
    let fraction: f64 = format!("0.{fraction}").parse().ok()?;
    let minutes = (fraction * 60.0).floor() as u32;
    (minutes != 0).then_some(minutes)
}

/// Empty attributes count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Parse a date attribute. RFC 3339 date-times contribute their calendar
/// date in `tz`.
pub fn parse_date(s: &str, tz: Tz) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            LOCAL_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .or_else(|_| DateTime::parse_from_rfc2822(s))
                .ok()
                .map(|dt| dt.with_timezone(&tz).date_naive())
        })
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime, NormalizeError> {
    let invalid = || NormalizeError::InvalidTime(s.to_string());

    let parts = s
        .trim()
        .split(':')
        .map(|p| p.parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    let time = match parts.as_slice() {
        [h, m] => NaiveTime::from_hms_opt(*h, *m, 0),
        [h, m, sec] => NaiveTime::from_hms_opt(*h, *m, *sec),
        _ => None,
    };
    time.ok_or_else(invalid)
}

/// Interpret a wall-clock date and time in `tz`. Ambiguous times (DST
/// fall-back) resolve to the earlier instant.
fn combine(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>, NormalizeError> {
    let local = date.and_time(time);
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| NormalizeError::NonexistentLocalTime(local.to_string(), tz.name().into()))
}
