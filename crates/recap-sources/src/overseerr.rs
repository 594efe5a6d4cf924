//! Overseerr adapter: a user's media requests with their genres.

use crate::http::{ApiClient, ApiClientConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use recap_common::{OverseerrUserId, RecapError, Result};
use recap_config::OverseerrSettings;
use recap_stats::{Calendar, MediaRequest, RequestSource, RequestStatus, UserRef};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const SERVICE: &str = "Overseerr";

/// Requests fetched per page.
const PAGE_SIZE: u64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestPage {
    page_info: PageInfo,
    #[serde(default)]
    results: Vec<RawRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    results: u64,
}

/// A request as returned by `/api/v1/user/{id}/requests`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    /// Request id.
    pub id: u64,
    /// Numeric status: 1 pending, 2 approved, 3 declined, 4 failed, 5 completed.
    pub status: u8,
    /// When the request was made.
    pub created_at: DateTime<Utc>,
    /// `movie` or `tv`.
    #[serde(rename = "type", default)]
    pub media_type: String,
    /// The requested media.
    #[serde(default)]
    pub media: Option<RequestedMedia>,
}

/// The media a request points at.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedMedia {
    /// TMDB id used for the details lookup.
    #[serde(default)]
    pub tmdb_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MediaDetails {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

/// Map Overseerr's numeric request status.
pub const fn request_status(code: u8) -> Option<RequestStatus> {
    match code {
        1 => Some(RequestStatus::Pending),
        2 => Some(RequestStatus::Approved),
        3 => Some(RequestStatus::Declined),
        4 => Some(RequestStatus::Failed),
        5 => Some(RequestStatus::Completed),
        _ => None,
    }
}

/// Overseerr API client
#[derive(Debug, Clone)]
pub struct OverseerrClient {
    api: ApiClient,
    calendar: Calendar,
    genre_lookup_concurrency: usize,
}

impl OverseerrClient {
    /// Create a client from the `overseerr` settings.
    ///
    /// `calendar` decides which requests fall in a year.
    pub fn new(settings: &OverseerrSettings, calendar: Calendar) -> Result<Self> {
        let api = ApiClient::new(
            ApiClientConfig::new(
                SERVICE,
                &settings.url,
                Duration::from_secs(settings.timeout_seconds),
            )
            .with_header("x-api-key", &settings.api_key),
        )?;
        Ok(Self {
            api,
            calendar,
            genre_lookup_concurrency: settings.genre_lookup_concurrency.max(1),
        })
    }

    /// Every request the user has made, across all pages.
    #[instrument(skip(self))]
    pub async fn user_requests(&self, user_id: OverseerrUserId) -> Result<Vec<RawRequest>> {
        let path = format!("api/v1/user/{user_id}/requests");
        let mut requests = Vec::new();
        loop {
            let skip = requests.len() as u64;
            let page: RequestPage = self
                .api
                .get_json(
                    &path,
                    &[("take", PAGE_SIZE.to_string()), ("skip", skip.to_string())],
                )
                .await?;
            let fetched = page.results.len();
            requests.extend(page.results);
            if fetched == 0 || requests.len() as u64 >= page.page_info.results {
                break;
            }
        }
        debug!(requests = requests.len(), "Fetched user requests");
        Ok(requests)
    }

    /// Genres of one requested title. Lookup failures yield no genres.
    async fn genres(&self, request: &RawRequest) -> Vec<String> {
        let Some(tmdb_id) = request.media.as_ref().and_then(|m| m.tmdb_id) else {
            return Vec::new();
        };
        let kind = if request.media_type == "tv" { "tv" } else { "movie" };
        let path = format!("api/v1/{kind}/{tmdb_id}");

        match self.api.get_json::<MediaDetails>(&path, &[]).await {
            Ok(details) => details.genres.into_iter().map(|g| g.name).collect(),
            Err(e) => {
                warn!(request = request.id, error = %e, "Genre lookup failed");
                Vec::new()
            }
        }
    }

    fn in_year(&self, request: &RawRequest, year: i32) -> bool {
        self.calendar
            .year_month(request.created_at.timestamp())
            .is_some_and(|(y, _)| y == year)
    }
}

#[async_trait]
impl RequestSource for OverseerrClient {
    async fn media_requests(&self, user: &UserRef, year: i32) -> Result<Vec<MediaRequest>> {
        let user_id = user.overseerr_id.ok_or_else(|| {
            RecapError::validation_field("User has no Overseerr id", "overseerr_user_id")
        })?;

        let in_year: Vec<(RawRequest, RequestStatus)> = self
            .user_requests(user_id)
            .await?
            .into_iter()
            .filter(|request| self.in_year(request, year))
            .filter_map(|request| {
                let status = request_status(request.status);
                if status.is_none() {
                    debug!(request = request.id, code = request.status, "Unknown request status");
                }
                status.map(|s| (request, s))
            })
            .collect();

        let mut requests: Vec<MediaRequest> = stream::iter(in_year)
            .map(|(request, status)| async move {
                let genres = self.genres(&request).await;
                MediaRequest {
                    id: request.id,
                    status,
                    media_type: request.media_type,
                    genres,
                }
            })
            .buffer_unordered(self.genre_lookup_concurrency)
            .collect()
            .await;
        requests.sort_by_key(|r| r.id);

        info!(requests = requests.len(), year, "Fetched media requests");
        Ok(requests)
    }
}
