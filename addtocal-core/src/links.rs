//! URL builders for the web calendar providers.
//!
//! Every query value is percent-encoded on its own, so spaces, `&`, `#` and
//! non-ASCII text in event fields cannot break the surrounding URL. Missing
//! fields keep their key with an empty value.

use crate::event::EventData;

const GOOGLE_BASE: &str = "https://www.google.com/calendar/render?action=TEMPLATE";
const OUTLOOK_LIVE_BASE: &str = "http://calendar.live.com/calendar/calendar.aspx?rru=addevent";
const YAHOO_BASE: &str = "https://calendar.yahoo.com/?v=60";

pub fn google(event: &EventData) -> String {
    let dates = format!(
        "{}/{}",
        encode(&event.start_stamp()),
        encode(&event.end_stamp())
    );

    with_query(
        GOOGLE_BASE,
        &[
            ("text", encode_opt(&event.title)),
            ("dates", dates),
            ("location", encode_opt(&event.location)),
            ("details", encode_opt(&event.description)),
        ],
    )
}

pub fn outlook_live(event: &EventData) -> String {
    with_query(
        OUTLOOK_LIVE_BASE,
        &[
            ("summary", encode_opt(&event.title)),
            ("dtstart", encode(&event.start_stamp())),
            ("dtend", encode(&event.end_stamp())),
            ("location", encode_opt(&event.location)),
            ("description", encode_opt(&event.description)),
        ],
    )
}

pub fn yahoo(event: &EventData) -> String {
    with_query(
        YAHOO_BASE,
        &[
            ("title", encode_opt(&event.title)),
            ("st", encode(&event.start_stamp())),
            ("dur", encode_opt(&event.duration)),
            ("in_loc", encode_opt(&event.location)),
            ("desc", encode_opt(&event.description)),
        ],
    )
}

/// Append already-encoded `key=value` pairs to a base URL that carries a query.
fn with_query(base: &str, params: &[(&str, String)]) -> String {
    params.iter().fold(base.to_string(), |mut url, (key, value)| {
        url.push('&');
        url.push_str(key);
        url.push('=');
        url.push_str(value);
        url
    })
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn encode_opt(value: &Option<String>) -> String {
    value.as_deref().map(encode).unwrap_or_default()
}
