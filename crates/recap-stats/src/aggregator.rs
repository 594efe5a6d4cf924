//! Content aggregation: rolls watch events up into per-movie and per-show totals.

use crate::types::{ContentAggregate, ContentKind, ContentSummary, ShowAggregate, WatchEvent};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Aggregate a batch of watch events.
///
/// Movies are keyed by title and shows by show title. Each event contributes
/// its own floored minutes, so the result does not depend on input order.
/// Lists come back most watched first, ties broken by title.
pub fn aggregate_content<'a, I>(events: I) -> ContentSummary
where
    I: IntoIterator<Item = &'a WatchEvent>,
{
    let mut movies: BTreeMap<&str, ContentAggregate> = BTreeMap::new();
    let mut shows: BTreeMap<&str, ShowAggregate> = BTreeMap::new();
    let mut summary = ContentSummary::default();

    for event in events {
        let minutes = event.watched_minutes();
        summary.total_watch_minutes = summary.total_watch_minutes.saturating_add(minutes);

        match event.kind {
            ContentKind::Movie => {
                summary.movies_watch_minutes = summary.movies_watch_minutes.saturating_add(minutes);
                let entry = movies
                    .entry(event.grouping_key())
                    .or_insert_with(|| ContentAggregate {
                        title: event.grouping_key().to_string(),
                        year: event.year,
                        rating: event.rating,
                        content_ref: event.content_ref.clone(),
                        total_watch_minutes: 0,
                        play_count: 0,
                    });
                entry.total_watch_minutes = entry.total_watch_minutes.saturating_add(minutes);
                entry.play_count = entry.play_count.saturating_add(1);
            }
            ContentKind::Episode => {
                summary.shows_watch_minutes = summary.shows_watch_minutes.saturating_add(minutes);
                summary.episodes_watched_count = summary.episodes_watched_count.saturating_add(1);
                let entry = shows
                    .entry(event.grouping_key())
                    .or_insert_with(|| ShowAggregate {
                        title: event.grouping_key().to_string(),
                        year: event.year,
                        rating: event.rating,
                        content_ref: event.show_ref.clone(),
                        total_watch_minutes: 0,
                        play_count: 0,
                        episodes_watched: 0,
                    });
                entry.total_watch_minutes = entry.total_watch_minutes.saturating_add(minutes);
                entry.play_count = entry.play_count.saturating_add(1);
                entry.episodes_watched = entry.episodes_watched.saturating_add(1);
            }
        }
    }

    summary.movies_watched_count = movies.len();
    summary.shows_watched_count = shows.len();

    // BTreeMap iteration is title-ascending; a stable sort keeps that for ties.
    summary.movies = movies.into_values().collect();
    summary.movies.sort_by(|a, b| by_minutes_desc(a.total_watch_minutes, b.total_watch_minutes));
    summary.shows = shows.into_values().collect();
    summary.shows.sort_by(|a, b| by_minutes_desc(a.total_watch_minutes, b.total_watch_minutes));

    summary
}

fn by_minutes_desc(a: u64, b: u64) -> Ordering {
    b.cmp(&a)
}
