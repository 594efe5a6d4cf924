//! Default values for every configuration section.

use crate::schema::*;
use recap_common::LoggingConfig;

impl Default for Config {
    fn default() -> Self {
        Self {
            tautulli: TautulliSettings::default(),
            plex: None,
            overseerr: None,
            stats: StatsSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TautulliSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8181".to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
            rate_limit_per_sec: 10,
            page_size: 1000,
        }
    }
}

impl Default for PlexSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:32400".to_string(),
            token: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl Default for OverseerrSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:5055".to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
            genre_lookup_concurrency: 8,
        }
    }
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            top_limit: 10,
            title_leaderboard_limit: 3,
            history_timeout_seconds: 300,
            source_timeout_seconds: 300,
        }
    }
}
