//! Supported calendar providers and link dispatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddToCalError;
use crate::event::EventData;
use crate::{ics, links};

/// A calendar service or file format targeted by a generated link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    #[serde(rename = "outlooklive")]
    OutlookLive,
    Yahoo,
    Ics,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Google,
        Provider::OutlookLive,
        Provider::Yahoo,
        Provider::Ics,
    ];

    /// The name used in `data-addtocal-type` attributes
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OutlookLive => "outlooklive",
            Provider::Yahoo => "yahoo",
            Provider::Ics => "ics",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Google => "Google Calendar",
            Provider::OutlookLive => "Outlook.com",
            Provider::Yahoo => "Yahoo Calendar",
            Provider::Ics => "iCalendar file",
        }
    }

    /// Build the encoded link for `event`.
    ///
    /// `page_url` is only used by the ICS file, as its URL when the event has none.
    pub fn link(&self, event: &EventData, page_url: Option<&str>) -> String {
        match self {
            Provider::Google => links::google(event),
            Provider::OutlookLive => links::outlook_live(event),
            Provider::Yahoo => links::yahoo(event),
            Provider::Ics => ics::data_uri(event, page_url),
        }
    }
}

impl FromStr for Provider {
    type Err = AddToCalError;

    /// Names are matched exactly, as they appear in markup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| AddToCalError::UnknownProvider(s.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(provider.name().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_unknown_provider_names() {
        assert!(matches!(
            "outlook".parse::<Provider>(),
            Err(AddToCalError::UnknownProvider(name)) if name == "outlook"
        ));
        assert!("Google".parse::<Provider>().is_err());
        assert!("".parse::<Provider>().is_err());
    }

    #[test]
    fn test_link_dispatch() {
        let event = EventData::default();

        assert!(Provider::Google.link(&event, None).starts_with("https://www.google.com/calendar/render"));
        assert!(Provider::OutlookLive.link(&event, None).starts_with("http://calendar.live.com/"));
        assert!(Provider::Yahoo.link(&event, None).starts_with("https://calendar.yahoo.com/"));
        assert!(Provider::Ics.link(&event, None).starts_with("data:text/calendar;charset=utf8,"));
    }
}
