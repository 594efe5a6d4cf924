//! Normalization of raw history rows into [`WatchEvent`]s.

use crate::sources::HistoryRecord;
use crate::types::{ContentKind, ContentRef, WatchEvent};
use chrono::{Datelike, TimeZone};
use chrono_tz::Tz;
use tracing::debug;

/// Calendar used to derive years and months from epoch timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    tz: Tz,
}

impl Calendar {
    /// Calendar in the given time zone.
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Calendar in UTC.
    pub const fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// The time zone.
    pub const fn tz(&self) -> Tz {
        self.tz
    }

    /// Calendar year and month (1-12) of an epoch timestamp.
    pub fn year_month(&self, epoch_seconds: i64) -> Option<(i32, u32)> {
        self.tz
            .timestamp_opt(epoch_seconds, 0)
            .single()
            .map(|local| (local.year(), local.month()))
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Turn one raw row into a watch event for `target_year`.
///
/// Returns `None` when the row has no positive duration, no timestamp, a
/// timestamp outside `target_year`, an unsupported media type or a blank
/// grouping title.
pub fn normalize_event(
    record: &HistoryRecord,
    target_year: i32,
    calendar: &Calendar,
) -> Option<WatchEvent> {
    let watched_seconds = watched_seconds(record)?;

    let occurred_at = record.date.filter(|&ts| ts != 0)?;
    let (year, _) = calendar.year_month(occurred_at)?;
    if year != target_year {
        return None;
    }

    let kind = match record.media_type.as_deref()?.trim().to_ascii_lowercase().as_str() {
        "movie" => ContentKind::Movie,
        "episode" => ContentKind::Episode,
        _ => return None,
    };

    let title = non_blank(record.title.as_deref());
    let (title, show_title, content_ref, show_ref) = match kind {
        ContentKind::Movie => (
            title?,
            None,
            record.rating_key.clone().map(ContentRef::movie),
            None,
        ),
        ContentKind::Episode => {
            let show_title = non_blank(record.grandparent_title.as_deref())?;
            (
                title.unwrap_or_else(|| show_title.clone()),
                Some(show_title),
                record.rating_key.clone().map(ContentRef::episode),
                record.grandparent_rating_key.clone().map(ContentRef::show),
            )
        }
    };

    Some(WatchEvent {
        kind,
        title,
        show_title,
        year: record.year.and_then(|y| i32::try_from(y).ok()),
        rating: record.rating,
        content_ref,
        show_ref,
        watched_seconds,
        occurred_at,
    })
}

/// Normalize a batch of rows, dropping the unusable ones.
pub fn normalize_history(
    records: &[HistoryRecord],
    target_year: i32,
    calendar: &Calendar,
) -> Vec<WatchEvent> {
    let events: Vec<WatchEvent> = records
        .iter()
        .filter_map(|record| normalize_event(record, target_year, calendar))
        .collect();

    debug!(
        kept = events.len(),
        dropped = records.len() - events.len(),
        target_year,
        "Normalized watch history"
    );
    events
}

/// Viewed duration, falling back to nominal duration; `None` unless positive.
fn watched_seconds(record: &HistoryRecord) -> Option<u64> {
    [record.play_duration, record.duration]
        .into_iter()
        .flatten()
        .find(|&seconds| seconds > 0)
        .and_then(|seconds| u64::try_from(seconds).ok())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
