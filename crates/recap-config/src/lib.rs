//! # Recap Config
//!
//! Type-safe configuration management for recap.
//!
//! This crate provides the YAML schema, defaults, environment overrides and
//! validation for the upstream services and the statistics engine.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::*;
pub use schema::*;
pub use validator::*;
