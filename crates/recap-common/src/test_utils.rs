//! Test utilities and shared test helpers for the recap workspace.
//!
//! This module provides common testing utilities and fixtures that can be used
//! across all crates in the workspace for unit and integration testing.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for creating a mock timestamp.
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Epoch seconds for a UTC wall-clock time.
pub fn epoch_at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> i64 {
    mock_timestamp(year, month, day, hour, min, sec).timestamp()
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// Create a minimal valid test configuration as YAML string.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
tautulli:
  url: "http://localhost:8181"
  api_key: "test_api_key"
"#
    }

    /// Create a full test configuration as YAML string.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "tautulli:\n",
            "  url: \"http://localhost:8181\"\n",
            "  api_key: \"test_api_key_full\"\n",
            "  timeout_seconds: 45\n",
            "  rate_limit_per_sec: 5\n",
            "  page_size: 500\n",
            "\n",
            "plex:\n",
            "  url: \"http://localhost:32400\"\n",
            "  token: \"plex_token\"\n",
            "\n",
            "overseerr:\n",
            "  url: \"http://localhost:5055\"\n",
            "  api_key: \"overseerr_key\"\n",
            "  genre_lookup_concurrency: 4\n",
            "\n",
            "stats:\n",
            "  timezone: \"Europe/Copenhagen\"\n",
            "  top_limit: 5\n",
            "  title_leaderboard_limit: 2\n",
            "  history_timeout_seconds: 120\n",
            "  source_timeout_seconds: 60\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  json_format: true\n"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_at_matches_known_instant() {
        assert_eq!(epoch_at(2024, 1, 1, 0, 0, 0), 1_704_067_200);
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }
}
