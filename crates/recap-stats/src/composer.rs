//! Statistics composer: builds a user's yearly recap from the configured sources.

use crate::aggregator::aggregate_content;
use crate::catalog::summarize_catalog;
use crate::leaderboard::{build_title_leaderboards, build_watch_time_leaderboard, TitleCandidate};
use crate::monthly::build_monthly_rollup;
use crate::normalizer::{normalize_history, Calendar};
use crate::requests::summarize_requests;
use crate::sources::{CatalogSource, HistorySource, RankingSource, RequestSource, UserRef};
use crate::types::{
    RequestStats, ServerStats, TitleLeaderboard, WatchTimeLeaderboard, YearlyStatistics,
};
use recap_common::{RecapError, Result};
use recap_config::StatsSettings;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Await `future`, failing with [`RecapError::Timeout`] once `limit` elapses.
pub(crate) async fn with_deadline<T, F>(operation: &str, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| RecapError::timeout(operation, limit))?
}

/// Tunables for a [`StatisticsComposer`].
#[derive(Debug, Clone)]
pub struct ComposerOptions {
    /// Calendar used for year and month boundaries.
    pub calendar: Calendar,
    /// Length of the top movie and top show lists.
    pub top_limit: usize,
    /// Movies and shows from the top of each list that get a title leaderboard.
    pub title_leaderboard_limit: usize,
    /// Deadline for the history fetch.
    pub history_timeout: Duration,
    /// Deadline for each optional source call.
    pub source_timeout: Duration,
}

impl ComposerOptions {
    /// Options from the `stats` configuration section.
    pub fn from_settings(settings: &StatsSettings) -> Result<Self> {
        Ok(Self {
            calendar: Calendar::new(settings.tz()?),
            top_limit: settings.top_limit,
            title_leaderboard_limit: settings.title_leaderboard_limit,
            history_timeout: settings.history_timeout(),
            source_timeout: settings.source_timeout(),
        })
    }
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            calendar: Calendar::utc(),
            top_limit: 10,
            title_leaderboard_limit: 3,
            history_timeout: Duration::from_secs(300),
            source_timeout: Duration::from_secs(300),
        }
    }
}

/// Composes [`YearlyStatistics`] from a mandatory history source and any
/// number of optional ones.
pub struct StatisticsComposer {
    history: Arc<dyn HistorySource>,
    ranking: Option<Arc<dyn RankingSource>>,
    catalog: Option<Arc<dyn CatalogSource>>,
    requests: Option<Arc<dyn RequestSource>>,
    options: ComposerOptions,
}

impl StatisticsComposer {
    /// Composer with only a history source and default options.
    pub fn new(history: Arc<dyn HistorySource>) -> Self {
        Self {
            history,
            ranking: None,
            catalog: None,
            requests: None,
            options: ComposerOptions::default(),
        }
    }

    /// Use a ranking source for leaderboards.
    #[must_use]
    pub fn with_ranking(mut self, ranking: Arc<dyn RankingSource>) -> Self {
        self.ranking = Some(ranking);
        self
    }

    /// Use a catalog source for server stats.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogSource>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use a request source for request stats.
    #[must_use]
    pub fn with_requests(mut self, requests: Arc<dyn RequestSource>) -> Self {
        self.requests = Some(requests);
        self
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: ComposerOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub const fn options(&self) -> &ComposerOptions {
        &self.options
    }

    /// Build the recap for `user` and `year`.
    ///
    /// Fails only when the history fetch fails or times out. Every optional
    /// source runs concurrently with its own deadline; a failure there leaves
    /// the matching field `None`.
    #[instrument(skip(self, user), fields(user = %user.tautulli_id))]
    pub async fn build(&self, user: &UserRef, year: i32) -> Result<YearlyStatistics> {
        let records = with_deadline(
            "watch history",
            self.options.history_timeout,
            self.history.watch_history(user, year),
        )
        .await?;

        let calendar = self.options.calendar;
        let events = normalize_history(&records, year, &calendar);
        let summary = aggregate_content(&events);
        let watch_time_by_month = build_monthly_rollup(&events, year, &calendar);

        let limit = self.options.title_leaderboard_limit;
        let candidates: Vec<TitleCandidate> = summary
            .movies
            .iter()
            .take(limit)
            .map(TitleCandidate::from)
            .chain(summary.shows.iter().take(limit).map(TitleCandidate::from))
            .collect();

        let (leaderboard, title_leaderboards, server_stats, request_stats) = tokio::join!(
            self.leaderboard(user, year),
            self.title_leaderboards(user, year, &candidates),
            self.server_stats(),
            self.request_stats(user, year),
        );

        let mut top_movies = summary.movies;
        top_movies.truncate(self.options.top_limit);
        let mut top_shows = summary.shows;
        top_shows.truncate(self.options.top_limit);

        info!(
            events = events.len(),
            minutes = summary.total_watch_minutes,
            months = watch_time_by_month.len(),
            "Built yearly statistics"
        );

        Ok(YearlyStatistics {
            year,
            user_id: user.tautulli_id,
            total_watch_minutes: summary.total_watch_minutes,
            movies_watch_minutes: summary.movies_watch_minutes,
            shows_watch_minutes: summary.shows_watch_minutes,
            movies_watched: summary.movies_watched_count,
            shows_watched: summary.shows_watched_count,
            episodes_watched: summary.episodes_watched_count,
            top_movies,
            top_shows,
            watch_time_by_month,
            leaderboard,
            title_leaderboards,
            server_stats,
            request_stats,
        })
    }

    async fn leaderboard(&self, user: &UserRef, year: i32) -> Option<WatchTimeLeaderboard> {
        let ranking = self.ranking.as_ref()?;
        let totals = self
            .optional("user totals", ranking.user_totals(year))
            .await?;
        Some(build_watch_time_leaderboard(&totals, user.tautulli_id))
    }

    async fn title_leaderboards(
        &self,
        user: &UserRef,
        year: i32,
        candidates: &[TitleCandidate],
    ) -> Option<Vec<TitleLeaderboard>> {
        let ranking = self.ranking.as_ref()?;
        let boards = build_title_leaderboards(
            ranking.as_ref(),
            candidates,
            year,
            user.tautulli_id,
            self.options.source_timeout,
        )
        .await;

        // All lookups failing reads as rankings being unavailable.
        let attempted = candidates.iter().any(|c| c.content_ref.is_some());
        if attempted && boards.is_empty() {
            warn!("All title leaderboard lookups failed; omitting");
            return None;
        }
        Some(boards)
    }

    async fn server_stats(&self) -> Option<ServerStats> {
        let catalog = self.catalog.as_ref()?;
        let sections = self
            .optional("library sections", catalog.library_sections())
            .await?;
        Some(summarize_catalog(&sections))
    }

    async fn request_stats(&self, user: &UserRef, year: i32) -> Option<RequestStats> {
        let requests = self.requests.as_ref()?;
        if user.overseerr_id.is_none() {
            debug!("No request-service id for user; skipping request stats");
            return None;
        }
        let list = self
            .optional("media requests", requests.media_requests(user, year))
            .await?;
        Some(summarize_requests(&list))
    }

    async fn optional<T, F>(&self, operation: &str, future: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        match with_deadline(operation, self.options.source_timeout, future).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(source = operation, error = %e, "Optional source failed; omitting");
                None
            }
        }
    }
}
