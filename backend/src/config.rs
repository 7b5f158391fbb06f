use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared::models::CalendarConfig;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::cache::SourceCache;

const ENV_PREFIX: &str = "ICSFILTER";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_source_ttl_secs")]
    pub source_ttl_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub calendars: Vec<CalendarConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub console_level: String,
    /// Daily log files named `<file_prefix>.<date>` are written when set.
    pub file_prefix: Option<String>,
    #[serde(default = "default_level")]
    pub file_level: String,
    #[serde(default = "default_log_directory")]
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: default_level(),
            file_prefix: None,
            file_level: default_level(),
            directory: default_log_directory(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8888))
}

fn default_refresh_interval_secs() -> u64 {
    1
}

fn default_source_ttl_secs() -> u64 {
    SourceCache::DEFAULT_TTL.as_secs()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    ".".to_string()
}

impl AppConfig {
    /// Load the config file, overlaid by `ICSFILTER__*` environment variables.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without touching the file system or environment.
    #[cfg(test)]
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .context("Failed to parse configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.calendars.is_empty() {
            bail!("At least one calendar must be configured");
        }

        let mut names = HashSet::new();
        for calendar in &self.calendars {
            calendar
                .validate()
                .with_context(|| format!("Invalid calendar '{}'", calendar.name))?;

            if !names.insert(calendar.key()) {
                bail!("Calendar '{}' is configured more than once", calendar.name);
            }
        }

        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be greater than zero");
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn source_ttl(&self) -> Duration {
        Duration::from_secs(self.source_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
