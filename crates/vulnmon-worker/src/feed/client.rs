//! HTTP client for the NVD CVE API (or any feed with the same envelope)

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{FeedSource, RawEntry, ENTRIES_KEY};
use crate::config::FeedConfig;
use crate::error::FetchError;

/// Header carrying the NVD API key
const API_KEY_HEADER: &str = "apikey";

/// Fetches one batch of raw entries per call
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    config: FeedConfig,
}

impl FeedClient {
    /// Build a client with the configured timeout, user agent and API key
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| FetchError::Client(format!("invalid API key header: {}", e)))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// GET the feed endpoint and return the entries in source order
    pub async fn fetch(&self) -> Result<Vec<RawEntry>, FetchError> {
        let mut request = self.client.get(&self.config.url);
        if let Some(per_page) = self.config.results_per_page {
            request = request.query(&[("resultsPerPage", per_page)]);
        }

        debug!(url = %self.config.url, "Requesting feed batch");

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.config.timeout_secs)
            } else {
                FetchError::Decode(e.to_string())
            }
        })?;

        let entries = entries_from_body(body)?;
        info!(entries = entries.len(), url = %self.config.url, "Fetched feed batch");
        Ok(entries)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.config.timeout_secs)
        } else {
            FetchError::Request(err)
        }
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_batch(&self) -> Result<Vec<RawEntry>, FetchError> {
        self.fetch().await
    }
}

/// Pull the entry list out of a response body.
///
/// A body without the entry key is an empty batch.
pub fn entries_from_body(body: Value) -> Result<Vec<RawEntry>, FetchError> {
    let Value::Object(mut map) = body else {
        return Err(FetchError::Decode("response body is not a JSON object".to_string()));
    };

    match map.remove(ENTRIES_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.into_iter().map(RawEntry::from).collect()),
        Some(_) => Err(FetchError::Decode(format!("'{}' is not an array", ENTRIES_KEY))),
    }
}
