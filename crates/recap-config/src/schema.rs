//! Configuration schema definitions using serde.

use chrono_tz::Tz;
use recap_common::{LoggingConfig, RecapError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for recap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tautulli configuration (watch history and rankings).
    pub tautulli: TautulliSettings,
    /// Plex configuration (library catalog); catalog stats are skipped without it.
    pub plex: Option<PlexSettings>,
    /// Overseerr configuration (media requests); request stats are skipped without it.
    pub overseerr: Option<OverseerrSettings>,
    /// Statistics engine configuration.
    pub stats: StatsSettings,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Tautulli API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TautulliSettings {
    /// Tautulli base URL, without the `/api/v2` suffix.
    pub url: String,
    /// Tautulli API key.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Requests per second allowed against Tautulli.
    pub rate_limit_per_sec: u32,
    /// Rows requested per `get_history` page.
    pub page_size: u32,
}

/// Plex Media Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlexSettings {
    /// Plex server base URL.
    pub url: String,
    /// `X-Plex-Token` used for library listings.
    pub token: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

/// Overseerr configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverseerrSettings {
    /// Overseerr base URL.
    pub url: String,
    /// Overseerr API key.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum concurrent genre lookups.
    pub genre_lookup_concurrency: usize,
}

/// Statistics engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    /// IANA time zone used to derive calendar years and months.
    pub timezone: String,
    /// Length of the top movies / top shows lists.
    pub top_limit: usize,
    /// How many top movies and top shows get a per-title leaderboard.
    pub title_leaderboard_limit: usize,
    /// Deadline for the mandatory history fetch.
    pub history_timeout_seconds: u64,
    /// Deadline for each optional source.
    pub source_timeout_seconds: u64,
}

impl StatsSettings {
    /// Parses the configured time zone.
    pub fn tz(&self) -> Result<Tz, RecapError> {
        self.timezone.parse::<Tz>().map_err(|e| {
            RecapError::validation_field(
                format!("Unknown time zone '{}': {e}", self.timezone),
                "stats.timezone",
            )
        })
    }

    /// Deadline for the mandatory history fetch.
    pub const fn history_timeout(&self) -> Duration {
        Duration::from_secs(self.history_timeout_seconds)
    }

    /// Deadline for each optional source.
    pub const fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_seconds)
    }
}
