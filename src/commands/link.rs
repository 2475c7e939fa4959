use std::collections::BTreeMap;

use addtocal_core::normalize::NormalizeOptions;
use addtocal_core::{EventAttributes, EventData, Provider};
use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;

#[derive(Args)]
pub struct LinkArgs {
    /// Provider name (google, outlooklive, yahoo, ics) or "all"
    provider: String,

    /// Start date (e.g. "2024-06-01")
    #[arg(short, long)]
    start_date: String,

    /// End date, defaults to the start date for timed events
    #[arg(long)]
    end_date: Option<String>,

    /// Start time (HH:MM or HH:MM:SS); omit for a full-day event
    #[arg(long)]
    start_time: Option<String>,

    /// End time (HH:MM or HH:MM:SS)
    #[arg(long)]
    end_time: Option<String>,

    #[arg(short, long)]
    title: Option<String>,

    #[arg(short, long)]
    location: Option<String>,

    #[arg(short, long)]
    description: Option<String>,

    /// Event URL (ICS only)
    #[arg(long)]
    url: Option<String>,

    /// Categories (ICS only)
    #[arg(long)]
    categories: Option<String>,

    /// Organizer, e.g. an email address (ICS only)
    #[arg(long)]
    organizer: Option<String>,

    /// Print the links as a JSON object keyed by provider name
    #[arg(long)]
    json: bool,
}

impl LinkArgs {
    fn attributes(&self) -> EventAttributes {
        EventAttributes {
            title: self.title.clone(),
            start_date: Some(self.start_date.clone()),
            end_date: self.end_date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            categories: self.categories.clone(),
            organizer: self.organizer.clone(),
        }
    }

    fn providers(&self) -> Result<Vec<Provider>> {
        if self.provider == "all" {
            return Ok(Provider::ALL.to_vec());
        }
        let provider = self.provider.parse::<Provider>().map_err(|e| {
            let available: Vec<_> = Provider::ALL.iter().map(|p| p.name()).collect();
            anyhow::anyhow!("{}. Available: {}, all", e, available.join(", "))
        })?;
        Ok(vec![provider])
    }
}

pub fn run(args: LinkArgs, options: &NormalizeOptions, page_url: Option<&str>) -> Result<()> {
    let providers = args.providers()?;
    let event = EventData::from_attributes(args.attributes(), options);

    let links: BTreeMap<&str, String> = providers
        .iter()
        .map(|p| (p.name(), p.link(&event, page_url)))
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&links).context("Failed to serialize links")?;
        println!("{}", json);
        return Ok(());
    }

    // A single link is printed bare so it can be piped
    if let [provider] = providers.as_slice() {
        println!("{}", links[provider.name()]);
        return Ok(());
    }

    for provider in &providers {
        println!("{}", provider.display_name().bold());
        println!("  {}", links[provider.name()]);
    }

    Ok(())
}
