//! Core of addtocal: turns the `data-addtocal-*` attributes of an HTML page
//! into "add to calendar" links.
//!
//! - `attributes` for the markup contract and raw event fields
//! - `normalize` for full-day vs. timed event dates and durations
//! - `provider`, `links` and `ics` for the per-provider link builders
//! - `binder` for rewriting a whole document

pub mod addtocal_config;
pub mod attributes;
pub mod binder;
pub mod error;
pub mod event;
pub mod ics;
pub mod links;
pub mod normalize;
pub mod provider;

pub use attributes::EventAttributes;
pub use binder::{BindOptions, BindReport, BoundDocument, bind_document};
pub use error::{AddToCalError, AddToCalResult, NormalizeError};
pub use event::{EventData, EventTime, NormalizedEvent};
pub use normalize::{DurationStyle, NormalizeOptions, Normalized, normalize};
pub use provider::Provider;
