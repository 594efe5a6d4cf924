//! # Recap Stats
//!
//! Yearly watch statistics for a single user.
//!
//! This crate turns raw viewing history into per-title totals, a monthly
//! rollup and leaderboards, and composes them with optional library and
//! request data into a [`YearlyStatistics`] value. Upstream services are
//! reached only through the traits in [`sources`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod catalog;
pub mod composer;
pub mod leaderboard;
pub mod monthly;
pub mod normalizer;
pub mod requests;
pub mod sources;
pub mod types;

pub use aggregator::aggregate_content;
pub use catalog::summarize_catalog;
pub use composer::{ComposerOptions, StatisticsComposer};
pub use leaderboard::{build_title_leaderboards, build_watch_time_leaderboard, TitleCandidate};
pub use monthly::build_monthly_rollup;
pub use normalizer::{normalize_event, normalize_history, Calendar};
pub use requests::summarize_requests;
pub use sources::*;
pub use types::*;
