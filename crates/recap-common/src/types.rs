//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Tautulli user ID (the Plex account id Tautulli reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TautulliUserId(pub u64);

impl fmt::Display for TautulliUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TautulliUserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// An Overseerr user ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverseerrUserId(pub u64);

impl fmt::Display for OverseerrUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OverseerrUserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
