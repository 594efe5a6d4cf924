//! # Recap CLI
//!
//! Command-line front end for the yearly watch recap.
//!
//! Loads configuration, wires the Tautulli, Plex and Overseerr clients into a
//! [`recap_stats::StatisticsComposer`] and prints the composed statistics as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod args;
pub mod error;

pub use app::*;
pub use args::Args;
pub use error::*;
