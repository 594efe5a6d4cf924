//! Integration tests for the recap command-line crate.
//!
//! These exercise configuration loading from disk, argument parsing and the
//! wiring of configured services into a composer.

use clap::Parser;
use recap_cli::{build_composer, run, Args, CliError};
use recap_common::test_utils::{config_fixtures, create_temp_dir, init_test_logging};
use recap_config::ConfigLoader;
use std::fs;

#[test]
fn test_full_config_builds_composer() {
    init_test_logging();
    let dir = create_temp_dir();
    let path = dir.path().join("recap.yaml");
    fs::write(&path, config_fixtures::full_config_yaml()).unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert!(config.plex.is_some());
    assert!(config.overseerr.is_some());

    let composer = build_composer(&config).unwrap();
    let options = composer.options();
    assert_eq!(options.calendar.tz(), chrono_tz::Europe::Copenhagen);
    assert_eq!(options.top_limit, 5);
    assert_eq!(options.title_leaderboard_limit, 2);
}

#[test]
fn test_minimal_config_builds_composer() {
    let dir = create_temp_dir();
    let path = dir.path().join("recap.yaml");
    fs::write(&path, config_fixtures::minimal_config_yaml()).unwrap();

    let config = ConfigLoader::load(Some(path.as_path())).unwrap();
    assert!(config.plex.is_none());
    assert!(config.overseerr.is_none());
    assert!(build_composer(&config).is_ok());
}

#[test]
fn test_args_point_at_config_file() {
    let dir = create_temp_dir();
    let path = dir.path().join("custom.yaml");
    fs::write(&path, config_fixtures::minimal_config_yaml()).unwrap();

    let args = Args::try_parse_from([
        "recap",
        "--user-id",
        "12",
        "--config",
        path.to_str().unwrap(),
    ])
    .unwrap();

    let (config, source) = ConfigLoader::load_with_source(args.config.as_deref()).unwrap();
    assert_eq!(config.tautulli.api_key, "test_api_key");
    assert_eq!(source, Some(path));
}

#[tokio::test]
async fn test_unreachable_history_fails_run() {
    let yaml = concat!(
        "tautulli:\n",
        "  url: \"http://127.0.0.1:9\"\n",
        "  api_key: \"key\"\n",
        "  timeout_seconds: 2\n",
    );
    let config = ConfigLoader::from_yaml_str(yaml).unwrap();
    let args = Args::try_parse_from(["recap", "--user-id", "1", "--year", "2024"]).unwrap();

    let result = run(&args, &config).await;
    assert!(matches!(result, Err(CliError::Recap(_))));
}

#[tokio::test]
async fn test_out_of_range_year_is_rejected_before_fetching() {
    let config = ConfigLoader::from_yaml_str(config_fixtures::minimal_config_yaml()).unwrap();
    let args = Args::try_parse_from(["recap", "--user-id", "1", "--year", "0"]).unwrap();

    let result = run(&args, &config).await;
    assert!(matches!(result, Err(CliError::Argument(_))));
}
