//! Statistics types produced by the engine.
//!
//! Every type here serializes with the camelCase keys the reporting layer
//! reads. Optional values are omitted from the JSON rather than written as
//! `null` or zero, so consumers can branch on key presence.

use recap_common::TautulliUserId;
use serde::{Deserialize, Serialize};

/// Kind of content a watch event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A feature film.
    Movie,
    /// A single episode of a show.
    Episode,
}

/// What an upstream rating key identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRefKind {
    /// A movie rating key.
    Movie,
    /// A show (grandparent) rating key.
    Show,
    /// An episode rating key.
    Episode,
}

/// Reference to one item on the media server, used for per-title lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRef {
    /// What the key identifies.
    pub kind: ContentRefKind,
    /// The server's rating key.
    pub rating_key: String,
}

impl ContentRef {
    /// Reference to a movie.
    pub fn movie(rating_key: impl Into<String>) -> Self {
        Self {
            kind: ContentRefKind::Movie,
            rating_key: rating_key.into(),
        }
    }

    /// Reference to a show.
    pub fn show(rating_key: impl Into<String>) -> Self {
        Self {
            kind: ContentRefKind::Show,
            rating_key: rating_key.into(),
        }
    }

    /// Reference to an episode.
    pub fn episode(rating_key: impl Into<String>) -> Self {
        Self {
            kind: ContentRefKind::Episode,
            rating_key: rating_key.into(),
        }
    }
}

/// One validated viewing of a movie or an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent {
    /// Movie or episode.
    pub kind: ContentKind,
    /// Movie title, or episode title for episodes.
    pub title: String,
    /// Show title; always present for episodes.
    pub show_title: Option<String>,
    /// Release year.
    pub year: Option<i32>,
    /// Audience or critic rating.
    pub rating: Option<f64>,
    /// Reference to the movie or episode itself.
    pub content_ref: Option<ContentRef>,
    /// Reference to the show an episode belongs to.
    pub show_ref: Option<ContentRef>,
    /// Seconds watched; always greater than zero.
    pub watched_seconds: u64,
    /// When the viewing happened, in epoch seconds.
    pub occurred_at: i64,
}

impl WatchEvent {
    /// Key this event is grouped under: the title for movies, the show title for episodes.
    pub fn grouping_key(&self) -> &str {
        match self.kind {
            ContentKind::Movie => &self.title,
            ContentKind::Episode => self.show_title.as_deref().unwrap_or(&self.title),
        }
    }

    /// Watched time in whole minutes, rounded down.
    pub const fn watched_minutes(&self) -> u64 {
        self.watched_seconds / 60
    }
}

/// Rolled-up totals for one movie title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAggregate {
    /// Movie title (grouping key).
    pub title: String,
    /// First-seen release year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// First-seen rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// First-seen content reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_ref: Option<ContentRef>,
    /// Sum of per-event whole minutes.
    #[serde(rename = "watchTime")]
    pub total_watch_minutes: u64,
    /// Number of viewings.
    pub play_count: u32,
}

/// Rolled-up totals for one show, across all of its episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowAggregate {
    /// Show title (grouping key).
    pub title: String,
    /// First-seen release year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// First-seen rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// First-seen show reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_ref: Option<ContentRef>,
    /// Sum of per-event whole minutes.
    #[serde(rename = "watchTime")]
    pub total_watch_minutes: u64,
    /// Number of episode viewings.
    pub play_count: u32,
    /// Episode viewings; repeats of the same episode count again.
    pub episodes_watched: u32,
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    /// Movies, most watched first.
    pub movies: Vec<ContentAggregate>,
    /// Shows, most watched first.
    pub shows: Vec<ShowAggregate>,
    /// Minutes across movies and episodes.
    pub total_watch_minutes: u64,
    /// Minutes across movies.
    pub movies_watch_minutes: u64,
    /// Minutes across episodes.
    pub shows_watch_minutes: u64,
    /// Distinct movie titles.
    pub movies_watched_count: usize,
    /// Distinct show titles.
    pub shows_watched_count: usize,
    /// Episode viewings.
    pub episodes_watched_count: u64,
}

/// One calendar month of the recap year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
    /// Month number, 1 to 12.
    pub month: u32,
    /// English month name.
    pub month_name: String,
    /// Minutes watched in the month.
    #[serde(rename = "watchTime")]
    pub total_watch_minutes: u64,
    /// The month's most watched movie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_movie: Option<ContentAggregate>,
    /// The month's most watched show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_show: Option<ShowAggregate>,
}

/// One user's line on a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Tautulli user id.
    pub user_id: TautulliUserId,
    /// Name shown on the leaderboard.
    pub display_name: String,
    /// Total minutes, always greater than zero.
    #[serde(rename = "totalWatchTime")]
    pub total_watch_minutes: u64,
    /// Minutes spent on movies.
    #[serde(rename = "moviesWatchTime")]
    pub movies_watch_minutes: u64,
    /// Minutes spent on episodes.
    #[serde(rename = "showsWatchTime")]
    pub shows_watch_minutes: u64,
}

/// Users ranked by total watch time for the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchTimeLeaderboard {
    /// Ranked entries, highest total first.
    pub entries: Vec<LeaderboardEntry>,
    /// 1-based rank of the user the recap is for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requesting_user_position: Option<usize>,
    /// Number of ranked users.
    pub total_users: usize,
}

/// Users ranked by watch time on one title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleLeaderboard {
    /// Title the ranking is for.
    pub title: String,
    /// The title's reference.
    pub content_ref: ContentRef,
    /// Ranked entries, highest total first.
    pub entries: Vec<LeaderboardEntry>,
    /// 1-based rank of the user the recap is for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requesting_user_position: Option<usize>,
    /// Number of users who watched the title.
    pub total_watchers: usize,
}

/// Library size and content counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    /// Items in movie libraries.
    pub movies_count: u64,
    /// Items in show libraries.
    pub shows_count: u64,
    /// Items in episode listings.
    pub episodes_count: u64,
    /// Sum of every file size.
    pub total_bytes: u64,
    /// `total_bytes` on a base-1024 ladder.
    pub total_bytes_formatted: String,
}

/// Genre tally across a user's requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreCount {
    /// Genre name.
    pub genre: String,
    /// Requests tagged with it.
    pub count: u32,
}

/// Media requests a user made during the year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    /// Every request in the year.
    pub total_requests: u32,
    /// Approved or already available.
    pub approved: u32,
    /// Awaiting a decision.
    pub pending: u32,
    /// Declined by an admin.
    pub declined: u32,
    /// Most requested genres.
    pub top_genres: Vec<GenreCount>,
}

/// The composed recap for one user and one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyStatistics {
    /// Recap year.
    pub year: i32,
    /// Tautulli user id the recap is for.
    pub user_id: TautulliUserId,
    /// Minutes across movies and episodes.
    #[serde(rename = "totalWatchTime")]
    pub total_watch_minutes: u64,
    /// Minutes across movies.
    #[serde(rename = "moviesWatchTime")]
    pub movies_watch_minutes: u64,
    /// Minutes across episodes.
    #[serde(rename = "showsWatchTime")]
    pub shows_watch_minutes: u64,
    /// Distinct movies watched.
    pub movies_watched: usize,
    /// Distinct shows watched.
    pub shows_watched: usize,
    /// Episode viewings.
    pub episodes_watched: u64,
    /// Most watched movies.
    pub top_movies: Vec<ContentAggregate>,
    /// Most watched shows.
    pub top_shows: Vec<ShowAggregate>,
    /// Months with activity, in calendar order.
    pub watch_time_by_month: Vec<MonthlyAggregate>,
    /// Server-wide ranking; absent when rankings are unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<WatchTimeLeaderboard>,
    /// Per-title rankings; absent when rankings are unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_leaderboards: Option<Vec<TitleLeaderboard>>,
    /// Library rollup; absent when the catalog is unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_stats: Option<ServerStats>,
    /// Request counts; absent when the request service is unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_stats: Option<RequestStats>,
}
