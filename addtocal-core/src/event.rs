//! Event types shared by the normalizer and the link builders.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use crate::attributes::EventAttributes;
use crate::error::NormalizeError;
use crate::normalize::{Normalized, NormalizeOptions, normalize};

/// A start or end stamp in the compact form calendar providers expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// Full-day event, rendered as `YYYYMMDD`
    Date(NaiveDate),
    /// Timed event, rendered as `YYYYMMDDTHHMMSSZ`
    DateTimeUtc(DateTime<Utc>),
    /// Raw attribute value passed through when the start date could not be parsed
    Unparsed(String),
}

impl EventTime {
    pub fn stamp(&self) -> String {
        match self {
            EventTime::Date(d) => d.format("%Y%m%d").to_string(),
            EventTime::DateTimeUtc(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
            EventTime::Unparsed(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stamp())
    }
}

/// Dates derived from an event's raw date and time attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub start: EventTime,
    pub end: EventTime,
    /// Only set for timed events, and only when the duration style yields a value
    pub duration: Option<String>,
}

/// The working copy handed to the link builders: the container's text
/// fields merged with its normalized dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventData {
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub categories: Option<String>,
    pub organizer: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub duration: Option<String>,
}

impl EventData {
    /// Normalize the attributes' dates and merge them into a working copy.
    /// Normalization failures are logged and leave the dates empty.
    pub fn from_attributes(attrs: EventAttributes, options: &NormalizeOptions) -> Self {
        let normalized = normalize(&attrs, options);
        if let Err(ref e) = normalized {
            warn!(
                title = attrs.title.as_deref().unwrap_or_default(),
                "Skipping event dates: {e}"
            );
        }
        Self::merge(attrs, normalized)
    }

    pub fn merge(attrs: EventAttributes, normalized: Result<Normalized, NormalizeError>) -> Self {
        let (start, end, duration) = match normalized {
            Ok(Normalized::Unchanged) => (
                attrs.start_date.map(EventTime::Unparsed),
                attrs.end_date.map(EventTime::Unparsed),
                None,
            ),
            Ok(Normalized::Dates(event)) => (Some(event.start), Some(event.end), event.duration),
            Err(_) => (None, None, None),
        };

        EventData {
            title: attrs.title,
            location: attrs.location,
            description: attrs.description,
            url: attrs.url,
            categories: attrs.categories,
            organizer: attrs.organizer,
            start,
            end,
            duration,
        }
    }

    /// Formatted start stamp, empty when the event has no start.
    pub fn start_stamp(&self) -> String {
        self.start.as_ref().map(EventTime::stamp).unwrap_or_default()
    }

    /// Formatted end stamp, empty when the event has no end.
    pub fn end_stamp(&self) -> String {
        self.end.as_ref().map(EventTime::stamp).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn attrs() -> EventAttributes {
        EventAttributes {
            title: Some("Launch".to_string()),
            start_date: Some("next friday".to_string()),
            end_date: Some("later".to_string()),
            location: Some("Berlin".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_stamp_formats() {
        let date = EventTime::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let dt = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 6, 1, 9, 5, 7).unwrap());

        assert_eq!(date.stamp(), "20240601");
        assert_eq!(dt.stamp(), "20240601T090507Z");
        assert_eq!(EventTime::Unparsed("soon".into()).to_string(), "soon");
    }

    #[test]
    fn test_merge_unchanged_passes_raw_dates_through() {
        let data = EventData::merge(attrs(), Ok(Normalized::Unchanged));

        assert_eq!(data.start, Some(EventTime::Unparsed("next friday".into())));
        assert_eq!(data.end, Some(EventTime::Unparsed("later".into())));
        assert_eq!(data.title.as_deref(), Some("Launch"));
        assert_eq!(data.location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn test_merge_failure_drops_dates_but_keeps_text() {
        let data = EventData::merge(attrs(), Err(NormalizeError::MissingTime));

        assert_eq!(data.start, None);
        assert_eq!(data.end, None);
        assert_eq!(data.start_stamp(), "");
        assert_eq!(data.title.as_deref(), Some("Launch"));
    }
}
