//! Configuration loading utilities

use crate::schema::{Config, OverseerrSettings, PlexSettings};
use recap_common::{RecapError, Result};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "RECAP_CONFIG_PATH";

/// Files probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["recap.yaml", "recap.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file '{path}': {source}")]
    IoError {
        /// File that could not be read
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Offending variable
        var: String,
        /// Underlying cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for RecapError {
    fn from(err: ConfigError) -> Self {
        RecapError::config_with_source(err.to_string(), err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides,
    /// then validate it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let mut config = Self::read_file(path.as_ref())?;
        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first available location.
    ///
    /// Lookup order: `explicit`, `RECAP_CONFIG_PATH`, `./recap.yaml`,
    /// `./recap.yml`, then built-in defaults. Environment overrides are
    /// applied in every case.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let (config, source) = Self::load_with_source(explicit)?;
        match source {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => info!("No configuration file found, using defaults and environment"),
        }
        Ok(config)
    }

    /// Like [`ConfigLoader::load`], returning the file that was read instead
    /// of logging it. Useful before a subscriber is installed.
    pub fn load_with_source(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
        match Self::resolve_path(explicit) {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                Ok((config, Some(path)))
            }
            None => {
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                config.validate()?;
                Ok((config, None))
            }
        }
    }

    /// Parse configuration from a YAML string without env overrides or validation.
    pub fn from_yaml_str(content: &str) -> std::result::Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn read_file(path: &Path) -> std::result::Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Apply process environment overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> std::result::Result<(), ConfigError> {
        Self::apply_overrides_from(config, |var| env::var(var).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to its value.
    pub fn apply_overrides_from<F>(
        config: &mut Config,
        lookup: F,
    ) -> std::result::Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TAUTULLI_URL") {
            config.tautulli.url = url;
        }
        if let Some(api_key) = lookup("TAUTULLI_API_KEY") {
            config.tautulli.api_key = api_key;
        }
        if let Some(timeout) = lookup("TAUTULLI_TIMEOUT") {
            config.tautulli.timeout_seconds = parse_var("TAUTULLI_TIMEOUT", &timeout)?;
        }

        if let Some(url) = lookup("PLEX_URL") {
            config.plex.get_or_insert_with(PlexSettings::default).url = url;
        }
        if let Some(token) = lookup("PLEX_TOKEN") {
            config.plex.get_or_insert_with(PlexSettings::default).token = token;
        }

        if let Some(url) = lookup("OVERSEERR_URL") {
            config.overseerr.get_or_insert_with(OverseerrSettings::default).url = url;
        }
        if let Some(api_key) = lookup("OVERSEERR_API_KEY") {
            config
                .overseerr
                .get_or_insert_with(OverseerrSettings::default)
                .api_key = api_key;
        }

        if let Some(timezone) = lookup("RECAP_TIMEZONE") {
            config.stats.timezone = timezone;
        }
        if let Some(timeout) = lookup("RECAP_SOURCE_TIMEOUT") {
            config.stats.source_timeout_seconds = parse_var("RECAP_SOURCE_TIMEOUT", &timeout)?;
        }
        if let Some(level) = lookup("RECAP_LOG_LEVEL") {
            config.logging.level = level;
        }

        debug!("Environment overrides applied");
        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> std::result::Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_replace_values() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("TAUTULLI_API_KEY", "from-env"),
            ("RECAP_TIMEZONE", "America/New_York"),
            ("RECAP_SOURCE_TIMEOUT", "42"),
        ]);
        ConfigLoader::apply_overrides_from(&mut config, lookup).unwrap();

        assert_eq!(config.tautulli.api_key, "from-env");
        assert_eq!(config.stats.timezone, "America/New_York");
        assert_eq!(config.stats.source_timeout_seconds, 42);
    }

    #[test]
    fn test_overrides_create_optional_sections() {
        let mut config = Config::default();
        assert!(config.plex.is_none());

        let lookup = lookup_from(&[("PLEX_TOKEN", "abc"), ("OVERSEERR_API_KEY", "def")]);
        ConfigLoader::apply_overrides_from(&mut config, lookup).unwrap();

        let plex = config.plex.expect("plex section created");
        assert_eq!(plex.token, "abc");
        assert_eq!(plex.url, "http://localhost:32400");
        assert_eq!(config.overseerr.expect("overseerr section created").api_key, "def");
    }

    #[test]
    fn test_bad_numeric_override_names_variable() {
        let mut config = Config::default();
        let lookup = lookup_from(&[("TAUTULLI_TIMEOUT", "soon")]);
        let err = ConfigLoader::apply_overrides_from(&mut config, lookup).unwrap_err();
        assert!(err.to_string().contains("TAUTULLI_TIMEOUT"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ConfigLoader::read_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }

    #[test]
    fn test_load_with_source_reports_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"tautulli:\n  url: \"http://localhost:8181\"\n  api_key: \"k\"\n",
        )
        .unwrap();

        let (config, source) = ConfigLoader::load_with_source(Some(file.path())).unwrap();
        assert_eq!(source.as_deref(), Some(file.path()));
        assert_eq!(config.tautulli.api_key, "k");
    }

    #[test]
    fn test_explicit_path_wins() {
        let resolved = ConfigLoader::resolve_path(Some(Path::new("custom.yaml")));
        assert_eq!(resolved, Some(PathBuf::from("custom.yaml")));
    }
}
