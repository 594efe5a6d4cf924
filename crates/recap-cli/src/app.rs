//! Wiring from configuration to a rendered recap.

use crate::args::Args;
use crate::error::{CliError, CliResult};
use chrono::{DateTime, Utc};
use recap_common::{OverseerrUserId, TautulliUserId};
use recap_config::Config;
use recap_sources::{OverseerrClient, PlexClient, TautulliClient};
use recap_stats::{Calendar, ComposerOptions, StatisticsComposer, UserRef, YearlyStatistics};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Build a composer with a source for every configured service.
///
/// Tautulli provides both history and rankings; Plex and Overseerr are
/// attached only when their sections are present.
pub fn build_composer(config: &Config) -> CliResult<StatisticsComposer> {
    let options = ComposerOptions::from_settings(&config.stats)?;
    let calendar = options.calendar;

    let tautulli = Arc::new(TautulliClient::new(&config.tautulli, calendar)?);
    let mut composer = StatisticsComposer::new(tautulli.clone())
        .with_ranking(tautulli)
        .with_options(options);

    if let Some(plex) = &config.plex {
        composer = composer.with_catalog(Arc::new(PlexClient::new(plex)?));
    } else {
        debug!("Plex not configured; server stats disabled");
    }
    if let Some(overseerr) = &config.overseerr {
        composer = composer.with_requests(Arc::new(OverseerrClient::new(overseerr, calendar)?));
    } else {
        debug!("Overseerr not configured; request stats disabled");
    }

    Ok(composer)
}

/// The requested year, or the year `now` falls in on `calendar`.
pub fn resolve_year(requested: Option<i32>, calendar: &Calendar, now: DateTime<Utc>) -> CliResult<i32> {
    match requested {
        Some(year) if (1..=9999).contains(&year) => Ok(year),
        Some(year) => Err(CliError::Argument(format!("year {year} is out of range"))),
        None => calendar
            .year_month(now.timestamp())
            .map(|(year, _)| year)
            .ok_or_else(|| CliError::Argument("cannot determine the current year".to_string())),
    }
}

/// The user described by the command line.
pub fn user_ref(args: &Args) -> UserRef {
    let user = UserRef::new(TautulliUserId(args.user_id));
    match args.overseerr_user_id {
        Some(id) => user.with_overseerr_id(OverseerrUserId(id)),
        None => user,
    }
}

/// Serialize a recap as JSON.
pub fn render(stats: &YearlyStatistics, pretty: bool) -> CliResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(stats)?
    } else {
        serde_json::to_string(stats)?
    };
    Ok(json)
}

/// Build the recap described by `args` and render it.
#[instrument(skip_all, fields(user = args.user_id))]
pub async fn run(args: &Args, config: &Config) -> CliResult<String> {
    let composer = build_composer(config)?;
    let year = resolve_year(args.year, &composer.options().calendar, Utc::now())?;
    info!(year, "Building recap");

    let stats = composer.build(&user_ref(args), year).await?;
    render(&stats, args.pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_common::test_utils::mock_timestamp;
    use recap_config::{OverseerrSettings, PlexSettings};

    fn args(extra: &[&str]) -> Args {
        use clap::Parser;
        let mut argv = vec!["recap", "--user-id", "3"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.tautulli.api_key = "key".to_string();
        config
    }

    #[test]
    fn test_resolve_year_explicit() {
        let now = mock_timestamp(2024, 6, 1, 0, 0, 0);
        assert_eq!(resolve_year(Some(2021), &Calendar::utc(), now).unwrap(), 2021);
        assert!(resolve_year(Some(0), &Calendar::utc(), now).is_err());
        assert!(resolve_year(Some(10_000), &Calendar::utc(), now).is_err());
    }

    #[test]
    fn test_resolve_year_follows_zone() {
        // 2024-12-31 12:00Z is already 2025 in Auckland
        let now = mock_timestamp(2024, 12, 31, 12, 0, 0);
        assert_eq!(resolve_year(None, &Calendar::utc(), now).unwrap(), 2024);
        let auckland = Calendar::new(chrono_tz::Pacific::Auckland);
        assert_eq!(resolve_year(None, &auckland, now).unwrap(), 2025);
    }

    #[test]
    fn test_user_ref_from_args() {
        let user = user_ref(&args(&[]));
        assert_eq!(user.tautulli_id, TautulliUserId(3));
        assert!(user.overseerr_id.is_none());

        let user = user_ref(&args(&["--overseerr-user-id", "9"]));
        assert_eq!(user.overseerr_id, Some(OverseerrUserId(9)));
    }

    #[test]
    fn test_build_composer_with_every_service() {
        let mut config = config();
        config.stats.timezone = "Europe/Copenhagen".to_string();
        config.plex = Some(PlexSettings {
            token: "t".to_string(),
            ..PlexSettings::default()
        });
        config.overseerr = Some(OverseerrSettings {
            api_key: "k".to_string(),
            ..OverseerrSettings::default()
        });

        let composer = build_composer(&config).unwrap();
        assert_eq!(composer.options().calendar.tz(), chrono_tz::Europe::Copenhagen);
    }

    #[test]
    fn test_build_composer_rejects_bad_zone() {
        let mut config = config();
        config.stats.timezone = "Nowhere/Special".to_string();
        assert!(matches!(build_composer(&config), Err(CliError::Recap(_))));
    }

    #[test]
    fn test_render_compact_and_pretty() {
        let stats = YearlyStatistics {
            year: 2024,
            user_id: TautulliUserId(3),
            total_watch_minutes: 0,
            movies_watch_minutes: 0,
            shows_watch_minutes: 0,
            movies_watched: 0,
            shows_watched: 0,
            episodes_watched: 0,
            top_movies: Vec::new(),
            top_shows: Vec::new(),
            watch_time_by_month: Vec::new(),
            leaderboard: None,
            title_leaderboards: None,
            server_stats: None,
            request_stats: None,
        };

        let compact = render(&stats, false).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"userId\":3"));
        assert!(!compact.contains("serverStats"));

        let pretty = render(&stats, true).unwrap();
        assert!(pretty.contains('\n'));
    }
}
