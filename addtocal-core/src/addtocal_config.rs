//! Global addtocal configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{AddToCalError, AddToCalResult};
use crate::normalize::{DurationStyle, NormalizeOptions};

/// Configuration at ~/.config/addtocal/config.toml
///
/// Every key can be overridden with an `ADDTOCAL_<KEY>` environment variable.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AddToCalConfig {
    /// IANA timezone that event start and end times are written in.
    /// Unset means the system timezone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default)]
    pub duration_style: DurationStyle,

    /// URL written into ICS files for events that have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

impl AddToCalConfig {
    pub fn config_path() -> AddToCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AddToCalError::Config("Could not determine config directory".into()))?
            .join("addtocal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (if any), then apply environment overrides.
    pub fn load() -> AddToCalResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> AddToCalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("ADDTOCAL"))
            .build()
            .map_err(|e| AddToCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AddToCalError::Config(e.to_string()))
    }

    /// Resolve the configured timezone, falling back to `fallback` when unset.
    pub fn timezone_or(&self, fallback: Tz) -> AddToCalResult<Tz> {
        match &self.timezone {
            Some(name) => parse_timezone(name),
            None => Ok(fallback),
        }
    }

    pub fn normalize_options(&self, fallback_tz: Tz) -> AddToCalResult<NormalizeOptions> {
        Ok(NormalizeOptions {
            timezone: self.timezone_or(fallback_tz)?,
            duration_style: self.duration_style,
        })
    }

    /// The configuration with the timezone in effect filled in.
    pub fn resolved(&self, fallback_tz: Tz) -> AddToCalResult<Self> {
        Ok(Self {
            timezone: Some(self.timezone_or(fallback_tz)?.name().to_string()),
            ..self.clone()
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AddToCalResult<()> {
        let contents = "\
# addtocal configuration

# Timezone that event times in your pages are written in (defaults to the system timezone):
# timezone = \"Europe/Berlin\"

# How Yahoo durations are written: \"legacy\" (minutes past the hour) or \"hours_minutes\" (HHMM):
# duration_style = \"legacy\"

# URL used in ICS files for events without a data-addtocal-url attribute:
# page_url = \"https://example.com/events\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AddToCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AddToCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

pub fn parse_timezone(name: &str) -> AddToCalResult<Tz> {
    Tz::from_str(name).map_err(|_| AddToCalError::InvalidTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("addtocal-test-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_config(
            "load",
            "timezone = \"America/New_York\"\nduration_style = \"hours_minutes\"\n",
        );

        let config = AddToCalConfig::load_from(&path).unwrap();

        assert_eq!(config.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(config.duration_style, DurationStyle::HoursMinutes);
        assert_eq!(config.page_url, None);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("addtocal-test-missing/config.toml");

        let config = AddToCalConfig::load_from(&path).unwrap();

        assert_eq!(config.duration_style, DurationStyle::Legacy);
    }

    #[test]
    fn test_default_config_is_all_comments() {
        let path = temp_config("default", "");
        AddToCalConfig::create_default_config(&path).unwrap();

        let config = AddToCalConfig::load_from(&path).unwrap();

        assert!(config.timezone.is_none());
        assert_eq!(config.duration_style, DurationStyle::Legacy);
    }

    #[test]
    fn test_timezone_resolution() {
        let config = AddToCalConfig {
            timezone: Some("Asia/Tokyo".into()),
            ..Default::default()
        };
        assert_eq!(config.timezone_or(Tz::UTC).unwrap(), chrono_tz::Asia::Tokyo);
        assert_eq!(AddToCalConfig::default().timezone_or(Tz::UTC).unwrap(), Tz::UTC);

        let bad = AddToCalConfig {
            timezone: Some("Mars/Olympus".into()),
            ..Default::default()
        };
        assert!(matches!(bad.timezone_or(Tz::UTC), Err(AddToCalError::InvalidTimezone(_))));
    }

    #[test]
    fn test_resolved_config_names_fallback_timezone() {
        let fallback = AddToCalConfig::default().resolved(chrono_tz::Europe::Berlin).unwrap();
        let configured = AddToCalConfig {
            timezone: Some("Asia/Tokyo".into()),
            page_url: Some("https://example.com".into()),
            ..Default::default()
        }
        .resolved(chrono_tz::Europe::Berlin)
        .unwrap();

        assert_eq!(fallback.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(configured.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(configured.page_url.as_deref(), Some("https://example.com"));
    }
}
