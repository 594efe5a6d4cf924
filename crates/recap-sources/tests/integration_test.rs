//! Integration tests for recap-sources crate.
//!
//! Each adapter is pointed at a local mock server serving canned upstream
//! payloads.

use mockito::{Matcher, Server};
use recap_common::test_utils::init_test_logging;
use recap_common::{OverseerrUserId, RecapError, TautulliUserId};
use recap_config::{OverseerrSettings, PlexSettings, TautulliSettings};
use recap_sources::{OverseerrClient, PlexClient, TautulliClient};
use recap_stats::{
    Calendar, CatalogSource, ContentRef, HistorySource, RankingSource, RequestSource,
    RequestStatus, SectionType, StatisticsComposer, UserRef,
};
use std::sync::Arc;

const MAR_1_2024: i64 = 1_709_294_400;
const MAR_2_2024: i64 = 1_709_380_800;
const JUL_4_2024: i64 = 1_720_123_200;
const DEC_30_2023: i64 = 1_703_937_600;

fn tautulli(server: &Server, page_size: u32) -> TautulliClient {
    let settings = TautulliSettings {
        url: server.url(),
        api_key: "secret".to_string(),
        page_size,
        ..TautulliSettings::default()
    };
    TautulliClient::new(&settings, Calendar::utc()).unwrap()
}

fn history_body(records_filtered: usize, rows: &str) -> String {
    format!(
        r#"{{"response": {{"result": "success", "message": null, "data": {{
            "recordsTotal": {records_filtered}, "recordsFiltered": {records_filtered}, "draw": 1,
            "data": [{rows}]
        }}}}}}"#
    )
}

fn movie_row(user_id: u64, name: &str, title: &str, key: &str, seconds: i64, date: i64) -> String {
    format!(
        r#"{{"date": {date}, "user_id": {user_id}, "friendly_name": "{name}", "media_type": "movie",
            "rating_key": {key}, "title": "{title}", "year": 2010, "play_duration": {seconds}}}"#
    )
}

fn episode_row(user_id: u64, name: &str, show_key: &str, seconds: i64, date: i64) -> String {
    format!(
        r#"{{"date": {date}, "user_id": {user_id}, "friendly_name": "{name}", "media_type": "episode",
            "rating_key": "900", "grandparent_rating_key": "{show_key}", "title": "Pilot",
            "grandparent_title": "Test Show", "year": "", "play_duration": {seconds}}}"#
    )
}

fn history_query(extra: Vec<Matcher>) -> Matcher {
    let mut matchers = vec![
        Matcher::UrlEncoded("apikey".into(), "secret".into()),
        Matcher::UrlEncoded("cmd".into(), "get_history".into()),
        Matcher::UrlEncoded("after".into(), "2023-12-31".into()),
        Matcher::UrlEncoded("before".into(), "2025-01-01".into()),
    ];
    matchers.extend(extra);
    Matcher::AllOf(matchers)
}

#[tokio::test]
async fn test_tautulli_history_is_paginated() {
    init_test_logging();
    let mut server = Server::new_async().await;

    let first = server
        .mock("GET", "/api/v2")
        .match_query(history_query(vec![
            Matcher::UrlEncoded("user_id".into(), "7".into()),
            Matcher::UrlEncoded("start".into(), "0".into()),
            Matcher::UrlEncoded("length".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(history_body(
            3,
            &[
                movie_row(7, "alice", "Inception", "1", 7200, MAR_1_2024),
                movie_row(7, "alice", "Inception", "1", 7200, MAR_2_2024),
            ]
            .join(","),
        ))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/api/v2")
        .match_query(history_query(vec![
            Matcher::UrlEncoded("user_id".into(), "7".into()),
            Matcher::UrlEncoded("start".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(history_body(3, &episode_row(7, "alice", "500", 2400, JUL_4_2024)))
        .expect(1)
        .create_async()
        .await;

    let records = tautulli(&server, 2)
        .watch_history(&UserRef::new(TautulliUserId(7)), 2024)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].rating_key.as_deref(), Some("1"));
    assert_eq!(records[2].grandparent_title.as_deref(), Some("Test Show"));
}

#[tokio::test]
async fn test_tautulli_error_envelope_is_upstream_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v2")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": {"result": "error", "message": "Invalid apikey", "data": {}}}"#)
        .create_async()
        .await;

    let err = tautulli(&server, 100)
        .watch_history(&UserRef::new(TautulliUserId(1)), 2024)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Tautulli API error: Invalid apikey");
}

#[tokio::test]
async fn test_tautulli_http_status_is_reported() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v2")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let err = tautulli(&server, 100).user_totals(2024).await.unwrap_err();
    assert!(matches!(err, RecapError::Upstream { .. }));
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_tautulli_rankings_group_by_user() {
    let mut server = Server::new_async().await;
    let rows = [
        movie_row(1, "alice", "Inception", "1", 7200, MAR_1_2024),
        episode_row(1, "alice", "500", 1800, MAR_2_2024),
        movie_row(2, "bob", "Inception", "1", 3600, JUL_4_2024),
        // previous year; dropped before grouping
        movie_row(2, "bob", "Inception", "1", 99_999, DEC_30_2023),
    ]
    .join(",");
    server
        .mock("GET", "/api/v2")
        .match_query(history_query(vec![Matcher::UrlEncoded("start".into(), "0".into())]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(history_body(4, &rows))
        .create_async()
        .await;

    let totals = tautulli(&server, 100).user_totals(2024).await.unwrap();

    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].display_name, "alice");
    assert_eq!(totals[0].total_seconds, 9000);
    assert_eq!(totals[0].movies_seconds, 7200);
    assert_eq!(totals[0].shows_seconds, 1800);
    assert_eq!(totals[1].display_name, "bob");
    assert_eq!(totals[1].total_seconds, 3600);
}

#[tokio::test]
async fn test_tautulli_show_totals_filter_on_grandparent_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2")
        .match_query(history_query(vec![Matcher::UrlEncoded(
            "grandparent_rating_key".into(),
            "500".into(),
        )]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(history_body(1, &episode_row(3, "carol", "500", 2400, JUL_4_2024)))
        .expect(1)
        .create_async()
        .await;

    let totals = tautulli(&server, 100)
        .title_totals(2024, &ContentRef::show("500"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].shows_seconds, 2400);
}

#[tokio::test]
async fn test_plex_library_sections() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/library/sections")
        .match_query(Matcher::Any)
        .match_header("x-plex-token", "plex-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"MediaContainer": {"size": 2, "Directory": [
                {"key": "1", "title": "Movies", "type": "movie"},
                {"key": "3", "title": "Music", "type": "artist"}
            ]}}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/library/sections/1/all")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"MediaContainer": {"Metadata": [
                {"title": "Inception", "Media": [{"Part": [{"size": 1073741824}]}]},
                {"title": "Heat", "Media": [{"Part": [{"size": 536870912}]}]}
            ]}}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/library/sections/3/all")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"MediaContainer": {"Metadata": [
                {"title": "Album", "Media": [{"Part": [{"size": 536870912}]}]}
            ]}}"#,
        )
        .create_async()
        .await;

    let plex = PlexClient::new(&PlexSettings {
        url: server.url(),
        token: "plex-token".to_string(),
        ..PlexSettings::default()
    })
    .unwrap();
    let sections = plex.library_sections().await.unwrap();

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].section_type, SectionType::Movie);
    assert_eq!(sections[0].items.len(), 2);
    assert_eq!(sections[1].section_type, SectionType::Other);

    let stats = recap_stats::summarize_catalog(&sections);
    assert_eq!(stats.movies_count, 2);
    assert_eq!(stats.total_bytes_formatted, "2 GB");
}

#[tokio::test]
async fn test_overseerr_requests_with_genres() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/user/4/requests")
        .match_query(Matcher::UrlEncoded("skip".into(), "0".into()))
        .match_header("x-api-key", "ovr-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"pageInfo": {"pages": 1, "pageSize": 100, "results": 3, "page": 1}, "results": [
                {"id": 1, "status": 5, "createdAt": "2024-02-01T10:00:00.000Z", "type": "movie",
                 "media": {"tmdbId": 603}},
                {"id": 2, "status": 1, "createdAt": "2024-05-01T10:00:00.000Z", "type": "tv",
                 "media": {"tmdbId": 1399}},
                {"id": 3, "status": 2, "createdAt": "2023-05-01T10:00:00.000Z", "type": "movie",
                 "media": {"tmdbId": 604}}
            ]}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/movie/603")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 603, "genres": [{"id": 28, "name": "Action"}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/tv/1399")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let client = OverseerrClient::new(
        &OverseerrSettings {
            url: server.url(),
            api_key: "ovr-key".to_string(),
            ..OverseerrSettings::default()
        },
        Calendar::utc(),
    )
    .unwrap();
    let user = UserRef::new(TautulliUserId(1)).with_overseerr_id(OverseerrUserId(4));
    let requests = client.media_requests(&user, 2024).await.unwrap();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].id, 1);
    assert_eq!(requests[0].status, RequestStatus::Completed);
    assert_eq!(requests[0].genres, vec!["Action".to_string()]);
    assert_eq!(requests[1].status, RequestStatus::Pending);
    assert!(requests[1].genres.is_empty());

    let stats = recap_stats::summarize_requests(&requests);
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.pending, 1);
}

#[tokio::test]
async fn test_composer_over_tautulli_with_unreachable_plex() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v2")
        .match_query(history_query(vec![Matcher::UrlEncoded("user_id".into(), "1".into())]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(history_body(
            2,
            &[
                movie_row(1, "alice", "Inception", "1", 7200, MAR_1_2024),
                episode_row(1, "alice", "500", 2400, JUL_4_2024),
            ]
            .join(","),
        ))
        .create_async()
        .await;

    // Nothing listens on port 9 locally.
    let plex = PlexClient::new(&PlexSettings {
        url: "http://127.0.0.1:9".to_string(),
        token: "t".to_string(),
        timeout_seconds: 2,
    })
    .unwrap();

    let composer = StatisticsComposer::new(Arc::new(tautulli(&server, 100)))
        .with_catalog(Arc::new(plex));
    let stats = composer
        .build(&UserRef::new(TautulliUserId(1)), 2024)
        .await
        .unwrap();

    assert_eq!(stats.total_watch_minutes, 160);
    assert_eq!(stats.movies_watched, 1);
    assert_eq!(stats.shows_watched, 1);
    assert!(stats.server_stats.is_none());
}
