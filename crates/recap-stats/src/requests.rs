//! Media request counts for the recap.

use crate::sources::{MediaRequest, RequestStatus};
use crate::types::{GenreCount, RequestStats};
use std::collections::BTreeMap;

/// Number of genres kept in [`RequestStats::top_genres`].
pub const TOP_GENRES: usize = 5;

/// Count requests by status and tally their genres.
///
/// Completed requests count as approved; failed ones count only toward the
/// total.
pub fn summarize_requests(requests: &[MediaRequest]) -> RequestStats {
    let mut stats = RequestStats::default();
    let mut genres: BTreeMap<&str, u32> = BTreeMap::new();

    for request in requests {
        stats.total_requests = stats.total_requests.saturating_add(1);
        match request.status {
            RequestStatus::Approved | RequestStatus::Completed => stats.approved += 1,
            RequestStatus::Pending => stats.pending += 1,
            RequestStatus::Declined => stats.declined += 1,
            RequestStatus::Failed => {}
        }

        for genre in &request.genres {
            let genre = genre.trim();
            if !genre.is_empty() {
                *genres.entry(genre).or_insert(0) += 1;
            }
        }
    }

    let mut top: Vec<GenreCount> = genres
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    top.sort_by(|a, b| b.count.cmp(&a.count));
    top.truncate(TOP_GENRES);
    stats.top_genres = top;

    stats
}
