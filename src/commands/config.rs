use addtocal_core::addtocal_config::AddToCalConfig;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub fn init(force: bool) -> Result<()> {
    let path = AddToCalConfig::config_path()?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}\n\
            Use --force to overwrite it.",
            path.display()
        );
    }

    AddToCalConfig::create_default_config(&path)?;
    println!("{}", format!("  Created {}", path.display()).green());

    Ok(())
}

/// Print the effective configuration (file, environment and flags merged,
/// timezone resolved)
pub fn show(config: &AddToCalConfig) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    print!("{}", content);
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", AddToCalConfig::config_path()?.display());
    Ok(())
}
