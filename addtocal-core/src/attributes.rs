//! The declarative attribute contract read from HTML markup.

/// Marks an element as a calendar container.
pub const CALENDAR: &str = "data-addtocal";
pub const TITLE: &str = "data-addtocal-title";
pub const START_DATE: &str = "data-addtocal-startdate";
pub const END_DATE: &str = "data-addtocal-enddate";
pub const START_TIME: &str = "data-addtocal-starttime";
pub const END_TIME: &str = "data-addtocal-endtime";
pub const DESCRIPTION: &str = "data-addtocal-desc";
pub const LOCATION: &str = "data-addtocal-location";
pub const URL: &str = "data-addtocal-url";
pub const CATEGORIES: &str = "data-addtocal-categories";
pub const ORGANIZER: &str = "data-addtocal-organizer";
/// Placed on action links inside a container; the value names the provider.
pub const LINK_TYPE: &str = "data-addtocal-type";

/// Raw event fields as they appear on a calendar container.
///
/// A `None` field was absent from the markup and is omitted from output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAttributes {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub categories: Option<String>,
    pub organizer: Option<String>,
}

impl EventAttributes {
    /// Read every event field through `get`, which looks up one attribute by name.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        EventAttributes {
            title: get(TITLE),
            start_date: get(START_DATE),
            end_date: get(END_DATE),
            start_time: get(START_TIME),
            end_time: get(END_TIME),
            location: get(LOCATION),
            description: get(DESCRIPTION),
            url: get(URL),
            categories: get(CATEGORIES),
            organizer: get(ORGANIZER),
        }
    }
}
