//! Per-batch ingestion statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters collected while processing one batch
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IngestStats {
    /// Entries returned by the feed
    pub fetched: usize,
    /// Records created by this batch
    pub inserted: usize,
    /// Existing records updated by this batch
    pub updated: usize,
    /// Entries skipped because they had no identifier
    pub normalization_failures: usize,
    /// Entries skipped because the write failed
    pub store_failures: usize,
    /// Affected-product rows written across all stored entries
    pub affected_written: usize,
    /// The feed call itself failed and the batch was treated as empty
    pub fetch_failed: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_secs: f64,
}

impl IngestStats {
    /// Start a new batch
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
        if let (Some(start), Some(end)) = (self.started_at, self.completed_at) {
            self.duration_secs = (end - start).num_milliseconds() as f64 / 1000.0;
        }
    }

    pub fn stored(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn failed(&self) -> usize {
        self.normalization_failures + self.store_failures
    }
}
