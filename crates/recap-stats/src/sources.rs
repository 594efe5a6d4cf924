//! Upstream collaborator contracts and the raw records they return.
//!
//! The engine never talks to the network. Adapters implement these traits
//! and hand back already-parsed records; everything downstream is pure.

use crate::types::ContentRef;
use async_trait::async_trait;
use recap_common::de::{optional_f64, optional_i64, optional_string};
use recap_common::{OverseerrUserId, Result, TautulliUserId};
use serde::{Deserialize, Serialize};

/// The user a recap is built for, with their identity on each upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    /// Tautulli user id; used for history and leaderboard ranks.
    pub tautulli_id: TautulliUserId,
    /// Overseerr user id; request stats are skipped without it.
    pub overseerr_id: Option<OverseerrUserId>,
}

impl UserRef {
    /// A user known only to Tautulli.
    pub const fn new(tautulli_id: TautulliUserId) -> Self {
        Self {
            tautulli_id,
            overseerr_id: None,
        }
    }

    /// Attach the user's Overseerr id.
    #[must_use]
    pub const fn with_overseerr_id(mut self, overseerr_id: OverseerrUserId) -> Self {
        self.overseerr_id = Some(overseerr_id);
        self
    }
}

/// One raw row of viewing history, shaped like Tautulli's `get_history` rows.
///
/// Every field is optional; the normalizer decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// When playback started, epoch seconds.
    #[serde(default, deserialize_with = "optional_i64")]
    pub date: Option<i64>,
    /// Tautulli user id of the viewer.
    #[serde(default, deserialize_with = "optional_i64")]
    pub user_id: Option<i64>,
    /// Viewer's display name.
    #[serde(default, deserialize_with = "optional_string")]
    pub friendly_name: Option<String>,
    /// `movie`, `episode`, `track`, ...
    #[serde(default, deserialize_with = "optional_string")]
    pub media_type: Option<String>,
    /// Rating key of the watched item.
    #[serde(default, deserialize_with = "optional_string")]
    pub rating_key: Option<String>,
    /// Rating key of the show, for episodes.
    #[serde(default, deserialize_with = "optional_string")]
    pub grandparent_rating_key: Option<String>,
    /// Movie or episode title.
    #[serde(default, deserialize_with = "optional_string")]
    pub title: Option<String>,
    /// Show title, for episodes.
    #[serde(default, deserialize_with = "optional_string")]
    pub grandparent_title: Option<String>,
    /// Release year.
    #[serde(default, deserialize_with = "optional_i64")]
    pub year: Option<i64>,
    /// Audience or critic rating.
    #[serde(default, deserialize_with = "optional_f64")]
    pub rating: Option<f64>,
    /// Seconds actually watched.
    #[serde(default, deserialize_with = "optional_i64")]
    pub play_duration: Option<i64>,
    /// Nominal length of the item in seconds.
    #[serde(default, deserialize_with = "optional_i64")]
    pub duration: Option<i64>,
}

/// Per-user watch totals for a year, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWatchTotal {
    /// Tautulli user id.
    pub user_id: TautulliUserId,
    /// Name shown on leaderboards.
    pub display_name: String,
    /// Seconds across movies and episodes.
    pub total_seconds: i64,
    /// Seconds across movies.
    pub movies_seconds: i64,
    /// Seconds across episodes.
    pub shows_seconds: i64,
}

/// Library section type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    /// Movies.
    Movie,
    /// Shows (no file sizes of their own).
    Show,
    /// Episodes of a show library.
    Episode,
    /// Music, photos and anything else.
    Other,
}

/// One item of a library listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    /// Item title.
    pub title: String,
    /// Size of each file backing the item, in bytes.
    pub file_sizes: Vec<u64>,
}

/// A library section listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySection {
    /// Section name.
    pub title: String,
    /// What the items are.
    pub section_type: SectionType,
    /// The items.
    pub items: Vec<LibraryItem>,
}

/// Status of a media request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting approval.
    Pending,
    /// Approved, possibly still downloading.
    Approved,
    /// Declined by an admin.
    Declined,
    /// Approved but the download failed.
    Failed,
    /// Approved and available.
    Completed,
}

/// One media request made by the user during the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRequest {
    /// Request id on the request service.
    pub id: u64,
    /// Current status.
    pub status: RequestStatus,
    /// `movie` or `tv`.
    pub media_type: String,
    /// Genres of the requested media; empty when the lookup failed.
    pub genres: Vec<String>,
}

/// Source of a user's viewing history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Raw history rows for `user` covering at least calendar `year`.
    async fn watch_history(&self, user: &UserRef, year: i32) -> Result<Vec<HistoryRecord>>;
}

/// Source of cross-user watch totals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// Totals for every user over `year`.
    async fn user_totals(&self, year: i32) -> Result<Vec<UserWatchTotal>>;

    /// Totals for every user over `year`, restricted to one title.
    async fn title_totals(&self, year: i32, content: &ContentRef) -> Result<Vec<UserWatchTotal>>;
}

/// Source of the media server's library listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Every library section with its items.
    async fn library_sections(&self) -> Result<Vec<LibrarySection>>;
}

/// Source of a user's media requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestSource: Send + Sync {
    /// Requests `user` made during `year`.
    async fn media_requests(&self, user: &UserRef, year: i32) -> Result<Vec<MediaRequest>>;
}
