//! ICS file generation.

use crate::event::{EventData, EventTime};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

const DATA_URI_PREFIX: &str = "data:text/calendar;charset=utf8,";

/// Build the `data:` URI for the ICS download link.
///
/// `page_url` stands in for the event URL when the container has none.
pub fn data_uri(event: &EventData, page_url: Option<&str>) -> String {
    let ics = generate_ics(event, page_url);
    format!("{}{}", DATA_URI_PREFIX, urlencoding::encode(&ics))
}

/// Generate .ics content for a single published event.
pub fn generate_ics(event: &EventData, page_url: Option<&str>) -> String {
    let mut cal = Calendar::new();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@addtocal", uuid::Uuid::new_v4()));
    ics_event.add_property(
        "DTSTAMP",
        chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string(),
    );
    ics_event.add_property("SEQUENCE", "0");

    add_time_property(&mut ics_event, "DTSTART", event.start.as_ref());
    add_time_property(&mut ics_event, "DTEND", event.end.as_ref());

    ics_event.summary(text(&event.title));
    ics_event.location(text(&event.location));
    ics_event.description(text(&event.description));

    let url = event.url.as_deref().or(page_url).unwrap_or_default();
    ics_event.add_property("URL", url);
    ics_event.add_property("CATEGORIES", text(&event.categories));
    ics_event.append_property(organizer_property(event.organizer.as_deref()));
    ics_event.add_property("CLASS", "PUBLIC");

    let ics_event = ics_event.done();
    cal.push(ics_event);
    let cal = cal.done();

    finish_ics(&cal.to_string())
}

/// Post-process the icalendar crate's output
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
/// - Mark the calendar as published (METHOD:PUBLISH)
fn finish_ics(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len() + 16);

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//addtocal//EN\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");

        if line == "BEGIN:VCALENDAR" {
            result.push_str("METHOD:PUBLISH\r\n");
        }
    }

    result
}

/// Add DTSTART/DTEND. Full-day stamps carry VALUE=DATE, missing ones are empty.
fn add_time_property(ics_event: &mut icalendar::Event, name: &str, time: Option<&EventTime>) {
    match time {
        Some(EventTime::Date(d)) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        Some(time) => {
            ics_event.add_property(name, time.stamp());
        }
        None => {
            ics_event.add_property(name, "");
        }
    }
}

/// ORGANIZER is a cal-address; bare email addresses get a mailto: prefix,
/// anything else is written as given.
fn organizer_property(organizer: Option<&str>) -> Property {
    match organizer {
        Some(org) if org.contains('@') && !org.starts_with("mailto:") => {
            Property::new("ORGANIZER", format!("mailto:{}", org))
        }
        Some(org) => Property::new("ORGANIZER", org),
        None => Property::new("ORGANIZER", ""),
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}
