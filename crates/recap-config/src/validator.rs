//! Runtime validation of a loaded configuration.

use crate::schema::{Config, OverseerrSettings, PlexSettings, StatsSettings, TautulliSettings};
use recap_common::{RecapError, Result};
use url::Url;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting the first problem found.
    pub fn validate(config: &Config) -> Result<()> {
        Self::validate_tautulli(&config.tautulli)?;
        if let Some(plex) = &config.plex {
            Self::validate_plex(plex)?;
        }
        if let Some(overseerr) = &config.overseerr {
            Self::validate_overseerr(overseerr)?;
        }
        Self::validate_stats(&config.stats)
    }

    fn validate_tautulli(settings: &TautulliSettings) -> Result<()> {
        validate_url(&settings.url, "tautulli.url")?;
        require_non_empty(&settings.api_key, "tautulli.api_key")?;
        require_positive(settings.timeout_seconds, "tautulli.timeout_seconds")?;
        require_positive(u64::from(settings.rate_limit_per_sec), "tautulli.rate_limit_per_sec")?;
        require_positive(u64::from(settings.page_size), "tautulli.page_size")
    }

    fn validate_plex(settings: &PlexSettings) -> Result<()> {
        validate_url(&settings.url, "plex.url")?;
        require_non_empty(&settings.token, "plex.token")?;
        require_positive(settings.timeout_seconds, "plex.timeout_seconds")
    }

    fn validate_overseerr(settings: &OverseerrSettings) -> Result<()> {
        validate_url(&settings.url, "overseerr.url")?;
        require_non_empty(&settings.api_key, "overseerr.api_key")?;
        require_positive(settings.timeout_seconds, "overseerr.timeout_seconds")?;
        require_positive(
            settings.genre_lookup_concurrency as u64,
            "overseerr.genre_lookup_concurrency",
        )
    }

    fn validate_stats(settings: &StatsSettings) -> Result<()> {
        settings.tz()?;
        require_positive(settings.top_limit as u64, "stats.top_limit")?;
        require_positive(settings.history_timeout_seconds, "stats.history_timeout_seconds")?;
        require_positive(settings.source_timeout_seconds, "stats.source_timeout_seconds")
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate(self)
    }
}

fn validate_url(value: &str, field: &str) -> Result<()> {
    let parsed = Url::parse(value).map_err(|e| {
        RecapError::validation_field(format!("'{value}' is not a valid URL: {e}"), field)
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(RecapError::validation_field(
            format!("unsupported URL scheme '{other}'"),
            field,
        )),
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecapError::validation_field(
            format!("{field} cannot be empty"),
            field,
        ));
    }
    Ok(())
}

fn require_positive(value: u64, field: &str) -> Result<()> {
    if value == 0 {
        return Err(RecapError::validation_field(
            format!("{field} must be greater than 0"),
            field,
        ));
    }
    Ok(())
}
