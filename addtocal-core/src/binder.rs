//! Binds generated links into an HTML document.
//!
//! Calendar containers (`data-addtocal`) are read as the rewriter reaches
//! them, and every `data-addtocal-type` link inside gets its `href` set to
//! the provider link for the innermost enclosing container.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::{Element, EndTag};
use lol_html::{HandlerResult, RewriteStrSettings, element, rewrite_str};
use tracing::{debug, info};

use crate::attributes::{self, EventAttributes};
use crate::error::{AddToCalError, AddToCalResult};
use crate::event::EventData;
use crate::normalize::NormalizeOptions;
use crate::provider::Provider;

#[derive(Debug, Clone, Default)]
pub struct BindOptions {
    pub normalize: NormalizeOptions,
    /// URL of the page being processed, used by ICS files for events without a URL
    pub page_url: Option<String>,
}

/// Counts from one pass over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    pub calendars: usize,
    pub links: usize,
    /// Links whose provider name is not recognized
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct BoundDocument {
    pub html: String,
    pub report: BindReport,
}

/// Start tags that close an open `<p>` element.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "dialog", "dir", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "li", "listing", "main", "menu", "nav", "ol", "p", "plaintext",
    "pre", "search", "section", "summary", "table", "ul", "xmp",
];

/// Elements whose items (`li`, `dt`, `dd`) close when the list ends.
const LISTS: &[&str] = &["ul", "ol", "menu", "dl"];

/// A calendar container whose element is still open.
struct OpenContainer {
    id: usize,
    tag: String,
    event: EventData,
}

#[derive(Default)]
struct OpenElements {
    containers: Vec<OpenContainer>,
    /// Container stack depth at the start of each open list
    lists: Vec<usize>,
}

impl OpenElements {
    /// Pop the containers a start tag closes without an end tag of their own:
    /// a `<p>` before a block-level element, an `<li>` before the next `<li>`,
    /// a `<dt>`/`<dd>` before the next term or description.
    fn close_implied(&mut self, tag: &str) {
        if CLOSES_P.contains(&tag) {
            self.close_innermost(|open| open == "p", false);
        }
        match tag {
            "li" => self.close_innermost(|open| open == "li", true),
            "dt" | "dd" => self.close_innermost(|open| open == "dt" || open == "dd", true),
            _ => {}
        }
    }

    /// Items only close siblings: a list opened inside the item keeps it open.
    fn close_innermost(&mut self, matches: impl Fn(&str) -> bool, list_item: bool) {
        let Some(i) = self.containers.iter().rposition(|c| matches(c.tag.as_str())) else {
            return;
        };
        if list_item && self.lists.iter().any(|&depth| depth > i) {
            return;
        }
        debug!(tag = %self.containers[i].tag, "Closing calendar without an end tag");
        self.containers.truncate(i);
    }
}

/// Rewrite `html`, filling in the `href` of every add-to-calendar link.
///
/// Links with an unknown provider and links outside any container are left
/// as they are. A container closes at its end tag, or where HTML closes it
/// implicitly: `<p>` at the next block-level start tag, `<li>`, `<dt>` and
/// `<dd>` at the next item or the end of their list. Any other container
/// whose end tag is missing stays open until the end of the document.
pub fn bind_document(html: &str, options: &BindOptions) -> AddToCalResult<BoundDocument> {
    let open: Rc<RefCell<OpenElements>> = Rc::new(RefCell::new(OpenElements::default()));
    let report = Rc::new(RefCell::new(BindReport::default()));

    let link_selector = format!("[{}]", attributes::LINK_TYPE);
    let container_selector = format!("[{}]", attributes::CALENDAR);

    let implied_close_handler = {
        let open = Rc::clone(&open);
        element!("*", move |el: &mut Element<'_, '_>| {
            let tag = el.tag_name();
            open.borrow_mut().close_implied(&tag);

            if LISTS.contains(&tag.as_str()) {
                if let Some(handlers) = el.end_tag_handlers() {
                    let depth = open.borrow().containers.len();
                    open.borrow_mut().lists.push(depth);
                    let open = Rc::clone(&open);
                    handlers.push(Box::new(move |_end: &mut EndTag<'_>| -> HandlerResult {
                        let mut open = open.borrow_mut();
                        if let Some(depth) = open.lists.pop() {
                            open.containers.truncate(depth);
                        }
                        Ok(())
                    }));
                }
            }
            Ok(())
        })
    };

    let link_handler = {
        let open = Rc::clone(&open);
        let report = Rc::clone(&report);
        let page_url = options.page_url.clone();
        element!(link_selector, move |el: &mut Element<'_, '_>| {
            let open = open.borrow();
            let Some(event) = open.containers.last().map(|c| &c.event) else {
                return Ok(());
            };
            let Some(name) = el.get_attribute(attributes::LINK_TYPE) else {
                return Ok(());
            };

            match name.parse::<Provider>() {
                Ok(provider) => {
                    let href = provider.link(event, page_url.as_deref());
                    el.set_attribute("href", &href)?;
                    report.borrow_mut().links += 1;
                }
                Err(e) => {
                    debug!("Skipping link: {e}");
                    report.borrow_mut().skipped += 1;
                }
            }
            Ok(())
        })
    };

    let container_handler = {
        let open = Rc::clone(&open);
        let report = Rc::clone(&report);
        let normalize = options.normalize.clone();
        element!(container_selector, move |el: &mut Element<'_, '_>| {
            let tag = el.tag_name();
            let attrs = EventAttributes::from_lookup(|name| {
                el.get_attribute(name)
                    .map(|value| html_escape::decode_html_entities(&value).into_owned())
            });
            debug!(title = attrs.title.as_deref().unwrap_or_default(), "Found calendar");
            let event = EventData::from_attributes(attrs, &normalize);

            // Void elements have no children to bind
            if let Some(handlers) = el.end_tag_handlers() {
                let id = report.borrow().calendars;
                open.borrow_mut().containers.push(OpenContainer { id, tag, event });
                let open = Rc::clone(&open);
                // May already be closed implicitly
                handlers.push(Box::new(move |_end: &mut EndTag<'_>| -> HandlerResult {
                    open.borrow_mut().containers.retain(|c| c.id != id);
                    Ok(())
                }));
            }

            report.borrow_mut().calendars += 1;
            Ok(())
        })
    };

    // Implied closes run before anything reads the stack. The link handler
    // comes before the container handler so an element that is both a
    // container and a link is bound to its enclosing container.
    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![implied_close_handler, link_handler, container_handler],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| AddToCalError::Rewrite(e.to_string()))?;

    let report = *report.borrow();
    info!(
        calendars = report.calendars,
        links = report.links,
        skipped = report.skipped,
        "Bound calendar links"
    );

    Ok(BoundDocument { html: output, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(html: &str) -> BoundDocument {
        bind_document(html, &BindOptions::default()).unwrap()
    }

    #[test]
    fn test_binds_every_provider_link() {
        let doc = bind(
            r#"<div data-addtocal data-addtocal-title="Launch party" data-addtocal-startdate="2024-06-01">
                <a data-addtocal-type="google">Google</a>
                <a data-addtocal-type="outlooklive">Outlook</a>
                <a data-addtocal-type="yahoo">Yahoo</a>
                <a data-addtocal-type="ics">ICS</a>
            </div>"#,
        );

        assert_eq!(doc.report, BindReport { calendars: 1, links: 4, skipped: 0 });
        assert!(doc.html.contains("href=\"https://www.google.com/calendar/render?action=TEMPLATE"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("dates=20240601/20240601"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("text=Launch%20party"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("dtstart=20240601"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("href=\"https://calendar.yahoo.com/?v=60"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("href=\"data:text/calendar;charset=utf8,BEGIN"), "HTML:\n{}", doc.html);
    }

    #[test]
    fn test_unknown_provider_is_skipped() {
        let doc = bind(
            r#"<div data-addtocal data-addtocal-startdate="2024-06-01">
                <a data-addtocal-type="myspace" href="/keep">Nope</a>
            </div>"#,
        );

        assert_eq!(doc.report.skipped, 1);
        assert_eq!(doc.report.links, 0);
        assert!(doc.html.contains("href=\"/keep\""), "HTML:\n{}", doc.html);
    }

    #[test]
    fn test_links_outside_containers_are_untouched() {
        let input = r#"<p><a data-addtocal-type="google">Stray</a></p>"#;
        let doc = bind(input);

        assert_eq!(doc.html, input);
        assert_eq!(doc.report, BindReport::default());
    }

    #[test]
    fn test_nested_containers_use_innermost_event() {
        let doc = bind(
            r#"<section data-addtocal data-addtocal-title="Outer" data-addtocal-startdate="2024-06-01">
                <div data-addtocal data-addtocal-title="Inner" data-addtocal-startdate="2024-07-01">
                    <a id="inner" data-addtocal-type="google">Inner</a>
                </div>
                <a id="outer" data-addtocal-type="google">Outer</a>
            </section>"#,
        );

        let inner_pos = doc.html.find("text=Inner").expect("inner link bound");
        let outer_pos = doc.html.find("text=Outer").expect("outer link bound");
        assert!(inner_pos < outer_pos);
        assert!(doc.html.contains("dates=20240701/20240701"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("dates=20240601/20240601"), "HTML:\n{}", doc.html);
        assert_eq!(doc.report.calendars, 2);
    }

    #[test]
    fn test_entities_in_attributes_are_decoded_then_encoded() {
        let doc = bind(
            r#"<div data-addtocal data-addtocal-title="Tom &amp; Jerry" data-addtocal-startdate="2024-06-01">
                <a data-addtocal-type="google">Google</a>
            </div>"#,
        );

        assert!(doc.html.contains("text=Tom%20%26%20Jerry"), "HTML:\n{}", doc.html);
    }

    #[test]
    fn test_invalid_times_still_bind_links_without_dates() {
        let doc = bind(
            r#"<div data-addtocal data-addtocal-title="Standup" data-addtocal-startdate="2024-06-01" data-addtocal-starttime="09:00">
                <a data-addtocal-type="yahoo">Yahoo</a>
            </div>"#,
        );

        assert_eq!(doc.report.links, 1);
        assert!(doc.html.contains("title=Standup"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("st=&"), "HTML:\n{}", doc.html);
    }

    #[test]
    fn test_page_url_reaches_ics_link() {
        let options = BindOptions {
            page_url: Some("https://example.com/events".to_string()),
            ..Default::default()
        };
        let doc = bind_document(
            r#"<div data-addtocal data-addtocal-startdate="2024-06-01"><a data-addtocal-type="ics">ICS</a></div>"#,
            &options,
        )
        .unwrap();

        let encoded_url = urlencoding::encode("URL:https://example.com/events").into_owned();
        assert!(doc.html.contains(&encoded_url), "HTML:\n{}", doc.html);
    }

    #[test]
    fn test_list_items_without_end_tags_bind_their_own_event() {
        let doc = bind(
            r#"<ul>
                <li data-addtocal data-addtocal-title="First" data-addtocal-startdate="2024-06-01"><a data-addtocal-type="google">Add</a>
                <li data-addtocal data-addtocal-title="Second" data-addtocal-startdate="2024-07-01"><a data-addtocal-type="google">Add</a>
            </ul>
            <a data-addtocal-type="google" href="/after">After</a>"#,
        );

        assert_eq!(doc.report, BindReport { calendars: 2, links: 2, skipped: 0 });
        assert!(doc.html.contains("text=First&dates=20240601/20240601"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("text=Second&dates=20240701/20240701"), "HTML:\n{}", doc.html);
        assert!(doc.html.contains("href=\"/after\""), "HTML:\n{}", doc.html);
    }

    #[test]
    fn test_nested_list_keeps_list_item_open() {
        let doc = bind(
            r#"<ul>
                <li data-addtocal data-addtocal-title="Outer" data-addtocal-startdate="2024-06-01">Agenda
                    <ul><li>Talks<li>Dinner</ul>
                    <a data-addtocal-type="google">Add</a>
            </ul>"#,
        );

        assert_eq!(doc.report.links, 1);
        assert!(doc.html.contains("text=Outer"), "HTML:\n{}", doc.html);
    }

    #[test]
    fn test_block_start_tag_closes_paragraph_container() {
        let doc = bind(
            r#"<p data-addtocal data-addtocal-title="Unclosed" data-addtocal-startdate="2024-06-01">para
            <div><a data-addtocal-type="google" href="/keep">Add</a></div>"#,
        );

        assert_eq!(doc.report, BindReport { calendars: 1, links: 0, skipped: 0 });
        assert!(doc.html.contains("href=\"/keep\""), "HTML:\n{}", doc.html);
        assert!(!doc.html.contains("text=Unclosed"), "HTML:\n{}", doc.html);
    }

    #[test]
    fn test_stray_end_tag_of_closed_paragraph_keeps_outer_container() {
        let doc = bind(
            r#"<section data-addtocal data-addtocal-title="Outer" data-addtocal-startdate="2024-06-01">
                <p data-addtocal data-addtocal-title="Inner" data-addtocal-startdate="2024-07-01">Inner<div>block</div></p>
                <a data-addtocal-type="google">Add</a>
            </section>"#,
        );

        assert_eq!(doc.report.links, 1);
        assert!(doc.html.contains("text=Outer"), "HTML:\n{}", doc.html);
        assert!(!doc.html.contains("text=Inner"), "HTML:\n{}", doc.html);
    }
}
