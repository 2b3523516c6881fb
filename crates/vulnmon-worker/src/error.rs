//! Worker error types
//!
//! Each enum matches the scope at which the ingestion loop handles it:
//!
//! - [`FetchError`]: a whole batch, logged and treated as an empty batch
//! - [`NormalizationError`]: one feed entry, logged and skipped
//! - [`MalformedField`]: one field, degraded to absent inside the normalizer
//! - [`StoreError`]: one entry's write, logged and skipped
//! - [`ConfigError`]: start-up only, fatal

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to retrieve a batch from the feed
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Feed client could not be built: {0}")]
    Client(String),

    #[error("Feed request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Feed request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Feed returned status {status}")]
    Status { status: StatusCode },

    #[error("Feed response could not be decoded: {0}")]
    Decode(String),
}

/// Failure that aborts normalization of a single entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Feed entry has no usable identifier")]
    MissingIdentifier,
}

/// A field that was present but could not be interpreted.
///
/// Never leaves the normalizer: every occurrence degrades to an absent or
/// empty value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedField {
    #[error("{field}: expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field}: unparseable timestamp '{value}'")]
    Timestamp { field: &'static str, value: String },

    #[error("{scheme}: no score entry")]
    EmptyScheme { scheme: &'static str },

    #[error("{scheme}: score {score} outside 0.0..=10.0")]
    ScoreOutOfRange { scheme: &'static str, score: f64 },

    #[error("criteria '{criteria}' has {segments} segments, need at least 5")]
    TooFewSegments { criteria: String, segments: usize },
}

impl MalformedField {
    pub(crate) fn wrong_type(field: &'static str, expected: &'static str) -> Self {
        Self::WrongType { field, expected }
    }
}

/// Failure to persist or read back records
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store did not answer within {0:?}")]
    Timeout(Duration),
}

/// Why a single feed entry was skipped
#[derive(Error, Debug)]
pub enum EntryError {
    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Invalid worker configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),

    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("DATABASE_MIN_CONNECTIONS ({min}) cannot be greater than DATABASE_MAX_CONNECTIONS ({max})")]
    PoolBounds { min: u32, max: u32 },
}
