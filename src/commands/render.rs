use std::io::{Read, Write};

use addtocal_core::normalize::NormalizeOptions;
use addtocal_core::{BindOptions, bind_document};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub fn run(
    input: &str,
    output: Option<&str>,
    normalize: NormalizeOptions,
    page_url: Option<String>,
) -> Result<()> {
    let html = read_input(input)?;

    let options = BindOptions { normalize, page_url };
    let bound = bind_document(&html, &options)
        .with_context(|| format!("Failed to rewrite {}", display_name(input)))?;

    match output {
        Some(path) => std::fs::write(path, &bound.html)
            .with_context(|| format!("Failed to write {}", path))?,
        None => std::io::stdout()
            .write_all(bound.html.as_bytes())
            .context("Failed to write to stdout")?,
    }

    let report = bound.report;
    let summary = format!(
        "  Bound {} {} in {} {}",
        report.links,
        pluralize("link", report.links),
        report.calendars,
        pluralize("calendar", report.calendars)
    );
    eprintln!("{}", summary.green());

    if report.skipped > 0 {
        let skipped = format!(
            "  Skipped {} {} with an unknown provider",
            report.skipped,
            pluralize("link", report.skipped)
        );
        eprintln!("{}", skipped.yellow());
    }

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut html = String::new();
        std::io::stdin()
            .read_to_string(&mut html)
            .context("Failed to read HTML from stdin")?;
        return Ok(html);
    }

    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
}

fn display_name(input: &str) -> &str {
    if input == "-" { "stdin" } else { input }
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
