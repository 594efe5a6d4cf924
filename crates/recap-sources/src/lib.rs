//! # Recap Sources
//!
//! HTTP adapters implementing the recap-stats collaborator traits.
//!
//! - [`TautulliClient`]: viewing history and cross-user rankings
//! - [`PlexClient`]: library listings with file sizes
//! - [`OverseerrClient`]: media requests with genres
//!
//! Every client shares the same [`http::ApiClient`] plumbing: a pooled
//! `reqwest` client, a `governor` rate limiter and single-attempt calls.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod http;
pub mod overseerr;
pub mod plex;
pub mod tautulli;

pub use overseerr::OverseerrClient;
pub use plex::PlexClient;
pub use tautulli::{HistoryFilter, TautulliClient};
