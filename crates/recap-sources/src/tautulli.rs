//! Tautulli adapter: watch history and cross-user rankings.
//!
//! History comes from the paginated `get_history` command. Rankings are
//! derived from the same history, grouped by user, so both sources agree on
//! what counts as watched time.

use crate::http::{ApiClient, ApiClientConfig};
use async_trait::async_trait;
use chrono::NaiveDate;
use recap_common::de::optional_i64;
use recap_common::{RecapError, Result, TautulliUserId};
use recap_config::TautulliSettings;
use recap_stats::{
    normalize_event, Calendar, ContentKind, ContentRef, ContentRefKind, HistoryRecord,
    HistorySource, RankingSource, UserRef, UserWatchTotal,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SERVICE: &str = "Tautulli";

/// Base response wrapper for all Tautulli API calls
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TautulliResponse<T> {
    /// Response data payload
    pub response: TautulliResponseData<T>,
}

/// Inner response data structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TautulliResponseData<T> {
    /// Result status (success, error)
    pub result: String,
    /// Optional message (usually present on errors)
    pub message: Option<String>,
    /// The actual data payload
    pub data: Option<T>,
}

impl<T> TautulliResponse<T> {
    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        self.response.result == "success"
    }

    /// Get the data payload, if present
    pub fn data(self) -> Option<T> {
        self.response.data
    }

    /// Get error message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.response.message.as_deref()
    }

    /// Unwrap the payload, turning an error result or missing data into an
    /// upstream error.
    pub fn into_result(self, cmd: &str) -> Result<T> {
        if !self.is_success() {
            let message = self
                .error_message()
                .map_or_else(|| format!("{cmd} failed"), ToString::to_string);
            return Err(RecapError::upstream(SERVICE, message));
        }
        self.data()
            .ok_or_else(|| RecapError::upstream(SERVICE, format!("{cmd} response contained no data")))
    }
}

/// One page of `get_history`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HistoryPage {
    /// Rows matching the filter across all pages.
    #[serde(rename = "recordsFiltered", default, deserialize_with = "optional_i64")]
    pub records_filtered: Option<i64>,
    /// Rows on this page.
    #[serde(default)]
    pub data: Vec<HistoryRecord>,
}

/// Query filter for `get_history`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Only this user's rows.
    pub user_id: Option<TautulliUserId>,
    /// Rows on or after this date.
    pub after: NaiveDate,
    /// Rows on or before this date.
    pub before: NaiveDate,
    /// Only rows for this movie or episode.
    pub rating_key: Option<String>,
    /// Only rows for episodes of this show.
    pub grandparent_rating_key: Option<String>,
}

impl HistoryFilter {
    /// Filter covering calendar `year`, widened by a day on each side so
    /// rows near midnight in any zone are included. Exact year filtering is
    /// left to the normalizer.
    pub fn for_year(year: i32) -> Result<Self> {
        let after = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.pred_opt());
        let before = NaiveDate::from_ymd_opt(year, 12, 31).and_then(|d| d.succ_opt());
        let (Some(after), Some(before)) = (after, before) else {
            return Err(RecapError::validation_field(
                format!("Year {year} is out of range"),
                "year",
            ));
        };
        Ok(Self {
            user_id: None,
            after,
            before,
            rating_key: None,
            grandparent_rating_key: None,
        })
    }

    /// Restrict to one user.
    #[must_use]
    pub const fn for_user(mut self, user_id: TautulliUserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Restrict to one title. Shows filter on the grandparent key.
    #[must_use]
    pub fn for_content(mut self, content: &ContentRef) -> Self {
        match content.kind {
            ContentRefKind::Show => self.grandparent_rating_key = Some(content.rating_key.clone()),
            ContentRefKind::Movie | ContentRefKind::Episode => {
                self.rating_key = Some(content.rating_key.clone());
            }
        }
        self
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("after", self.after.format("%Y-%m-%d").to_string()),
            ("before", self.before.format("%Y-%m-%d").to_string()),
        ];
        if let Some(user_id) = self.user_id {
            params.push(("user_id", user_id.to_string()));
        }
        if let Some(key) = &self.rating_key {
            params.push(("rating_key", key.clone()));
        }
        if let Some(key) = &self.grandparent_rating_key {
            params.push(("grandparent_rating_key", key.clone()));
        }
        params
    }
}

/// Tautulli API client
#[derive(Debug, Clone)]
pub struct TautulliClient {
    api: ApiClient,
    api_key: String,
    page_size: u32,
    calendar: Calendar,
}

impl TautulliClient {
    /// Create a client from the `tautulli` settings.
    ///
    /// `calendar` decides which rows fall in a year when building rankings.
    pub fn new(settings: &TautulliSettings, calendar: Calendar) -> Result<Self> {
        if settings.page_size == 0 {
            return Err(RecapError::config("Tautulli page size must be greater than 0"));
        }
        let api = ApiClient::new(
            ApiClientConfig::new(
                SERVICE,
                &settings.url,
                Duration::from_secs(settings.timeout_seconds),
            )
            .with_rate_limit(settings.rate_limit_per_sec),
        )?;
        Ok(Self {
            api,
            api_key: settings.api_key.clone(),
            page_size: settings.page_size,
            calendar,
        })
    }

    /// Run one API command and unwrap the response envelope.
    #[instrument(skip(self, params))]
    async fn command<T>(&self, cmd: &str, params: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut query = vec![("apikey", self.api_key.clone()), ("cmd", cmd.to_string())];
        query.extend(params.iter().map(|(k, v)| (*k, v.clone())));

        let response: TautulliResponse<T> = self.api.get_json("api/v2", &query).await?;
        response.into_result(cmd)
    }

    /// Fetch one page of history.
    pub async fn get_history_page(&self, filter: &HistoryFilter, start: u64) -> Result<HistoryPage> {
        let mut params = filter.to_params();
        params.push(("start", start.to_string()));
        params.push(("length", self.page_size.to_string()));
        params.push(("order_column", "date".to_string()));
        params.push(("order_dir", "asc".to_string()));
        self.command("get_history", &params).await
    }

    /// Fetch every history row matching `filter`, page by page.
    #[instrument(skip(self))]
    pub async fn fetch_history(&self, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>> {
        let mut records = Vec::new();
        loop {
            let start = records.len() as u64;
            let page = self.get_history_page(filter, start).await?;
            let fetched = page.data.len();
            records.extend(page.data);

            let total = page
                .records_filtered
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0);
            debug!(fetched, total, "Fetched history page");
            if fetched == 0 || records.len() as u64 >= total {
                break;
            }
        }
        info!(rows = records.len(), "Fetched watch history");
        Ok(records)
    }

    async fn totals_for(&self, filter: &HistoryFilter, year: i32) -> Result<Vec<UserWatchTotal>> {
        let records = self.fetch_history(filter).await?;
        Ok(group_user_totals(&records, year, &self.calendar))
    }
}

#[async_trait]
impl HistorySource for TautulliClient {
    async fn watch_history(&self, user: &UserRef, year: i32) -> Result<Vec<HistoryRecord>> {
        let filter = HistoryFilter::for_year(year)?.for_user(user.tautulli_id);
        self.fetch_history(&filter).await
    }
}

#[async_trait]
impl RankingSource for TautulliClient {
    async fn user_totals(&self, year: i32) -> Result<Vec<UserWatchTotal>> {
        self.totals_for(&HistoryFilter::for_year(year)?, year).await
    }

    async fn title_totals(&self, year: i32, content: &ContentRef) -> Result<Vec<UserWatchTotal>> {
        self.totals_for(&HistoryFilter::for_year(year)?.for_content(content), year)
            .await
    }
}

/// Sum each user's watched seconds for `year`, split into movies and shows.
///
/// Rows are filtered the same way a user's own history is, so a user's total
/// here matches their recap. Rows without a user id are ignored.
pub fn group_user_totals(
    records: &[HistoryRecord],
    year: i32,
    calendar: &Calendar,
) -> Vec<UserWatchTotal> {
    let mut by_user: BTreeMap<u64, UserWatchTotal> = BTreeMap::new();

    for record in records {
        let Some(user_id) = record.user_id.and_then(|id| u64::try_from(id).ok()) else {
            continue;
        };
        let Some(event) = normalize_event(record, year, calendar) else {
            continue;
        };
        // Floored per play, as the recap itself counts minutes.
        let seconds = i64::try_from(event.watched_minutes().saturating_mul(60)).unwrap_or(i64::MAX);
        let name = record
            .friendly_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let total = by_user.entry(user_id).or_insert_with(|| UserWatchTotal {
            user_id: TautulliUserId(user_id),
            display_name: name.map_or_else(|| user_id.to_string(), ToString::to_string),
            total_seconds: 0,
            movies_seconds: 0,
            shows_seconds: 0,
        });

        total.total_seconds = total.total_seconds.saturating_add(seconds);
        match event.kind {
            ContentKind::Movie => total.movies_seconds = total.movies_seconds.saturating_add(seconds),
            ContentKind::Episode => total.shows_seconds = total.shows_seconds.saturating_add(seconds),
        }
    }

    by_user.into_values().collect()
}
