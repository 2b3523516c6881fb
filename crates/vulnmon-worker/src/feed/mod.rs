//! Vulnerability feed retrieval

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;

pub use client::FeedClient;

/// Key of the entry list in a feed response body
pub const ENTRIES_KEY: &str = "vulnerabilities";

/// One feed entry exactly as delivered, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEntry(Value);

impl RawEntry {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Identifier for log lines, without any validation
    pub fn id_hint(&self) -> Option<&str> {
        self.0
            .get("cve")
            .and_then(|cve| cve.get("id"))
            .or_else(|| self.0.get("id"))
            .and_then(Value::as_str)
    }
}

impl From<Value> for RawEntry {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Anything that can hand the ingestion loop a batch of raw entries
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one batch. No retries: the caller decides what a failure means.
    async fn fetch_batch(&self) -> Result<Vec<RawEntry>, FetchError>;
}
