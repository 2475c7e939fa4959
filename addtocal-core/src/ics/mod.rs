//! ICS generation for the calendar-file download link.
//!
//! The event is written as a single-VEVENT calendar and embedded into a
//! `data:` URI, so the link works without any server.

mod generate;

pub use generate::{data_uri, generate_ics};
