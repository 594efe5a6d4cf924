//! Watch-time leaderboards, server-wide and per title.

use crate::composer::with_deadline;
use crate::sources::{RankingSource, UserWatchTotal};
use crate::types::{
    ContentAggregate, ContentRef, LeaderboardEntry, ShowAggregate, TitleLeaderboard,
    WatchTimeLeaderboard,
};
use futures::future::join_all;
use recap_common::{whole_minutes, TautulliUserId};
use std::time::Duration;
use tracing::{debug, warn};

/// Rank users by total watch time.
///
/// Totals are floored to whole minutes and users left with zero minutes are
/// dropped before ranking.
pub fn build_watch_time_leaderboard(
    totals: &[UserWatchTotal],
    requesting_user: TautulliUserId,
) -> WatchTimeLeaderboard {
    let entries = rank_entries(totals);
    WatchTimeLeaderboard {
        requesting_user_position: position_of(&entries, requesting_user),
        total_users: entries.len(),
        entries,
    }
}

/// An item that may get its own leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCandidate {
    /// Display title.
    pub title: String,
    /// Reference used for the lookup; items without one are skipped.
    pub content_ref: Option<ContentRef>,
}

impl From<&ContentAggregate> for TitleCandidate {
    fn from(movie: &ContentAggregate) -> Self {
        Self {
            title: movie.title.clone(),
            content_ref: movie.content_ref.clone(),
        }
    }
}

impl From<&ShowAggregate> for TitleCandidate {
    fn from(show: &ShowAggregate) -> Self {
        Self {
            title: show.title.clone(),
            content_ref: show.content_ref.clone(),
        }
    }
}

/// Build one leaderboard per candidate that carries a content reference.
///
/// Lookups run concurrently, each bounded by `timeout`. A failed lookup only
/// drops its own title; the rest are returned in candidate order.
pub async fn build_title_leaderboards(
    source: &dyn RankingSource,
    candidates: &[TitleCandidate],
    year: i32,
    requesting_user: TautulliUserId,
    timeout: Duration,
) -> Vec<TitleLeaderboard> {
    let lookups = candidates.iter().filter_map(|candidate| {
        let content_ref = candidate.content_ref.as_ref()?;
        Some(async move {
            let operation = format!("title totals for '{}'", candidate.title);
            match with_deadline(&operation, timeout, source.title_totals(year, content_ref)).await {
                Ok(totals) => {
                    let entries = rank_entries(&totals);
                    Some(TitleLeaderboard {
                        title: candidate.title.clone(),
                        content_ref: content_ref.clone(),
                        requesting_user_position: position_of(&entries, requesting_user),
                        total_watchers: entries.len(),
                        entries,
                    })
                }
                Err(e) => {
                    warn!(title = %candidate.title, error = %e, "Skipping title leaderboard");
                    None
                }
            }
        })
    });

    let boards: Vec<TitleLeaderboard> = join_all(lookups).await.into_iter().flatten().collect();
    debug!(
        requested = candidates.len(),
        built = boards.len(),
        "Built title leaderboards"
    );
    boards
}

/// Minutes are floored from each user's summed seconds. Sources that sum
/// per-play floored seconds keep these equal to the recap's own totals.
fn rank_entries(totals: &[UserWatchTotal]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = totals
        .iter()
        .map(|total| LeaderboardEntry {
            user_id: total.user_id,
            display_name: total.display_name.clone(),
            total_watch_minutes: whole_minutes(total.total_seconds),
            movies_watch_minutes: whole_minutes(total.movies_seconds),
            shows_watch_minutes: whole_minutes(total.shows_seconds),
        })
        .filter(|entry| entry.total_watch_minutes > 0)
        .collect();

    entries.sort_by(|a, b| {
        b.total_watch_minutes
            .cmp(&a.total_watch_minutes)
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries
}

fn position_of(entries: &[LeaderboardEntry], user: TautulliUserId) -> Option<usize> {
    entries
        .iter()
        .position(|entry| entry.user_id == user)
        .map(|index| index + 1)
}
