//! Domain types for the vulnerability store
//!
//! These types are written by the ingestion worker and read by the query layer,
//! which is why they live in the common crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source identifier used for records pulled from the NVD CVE API
pub const NVD_SOURCE: &str = "nvd";

/// Canonical, normalized vulnerability record.
///
/// `(source, source_id)` is the natural key: ingesting the same key again
/// updates the stored row instead of inserting a new one.
///
/// # Examples
///
/// ```rust
/// use vulnmon_common::types::VulnerabilityRecord;
///
/// let record = VulnerabilityRecord::new("nvd", "CVE-2024-0001");
/// assert_eq!(record.summary, "");
/// assert!(record.severity_score.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VulnerabilityRecord {
    /// Identifier assigned by the feed (e.g. "CVE-2024-0001")
    pub source_id: String,

    /// Feed the record came from (e.g. "nvd")
    pub source: String,

    pub published_at: Option<DateTime<Utc>>,

    pub last_modified_at: Option<DateTime<Utc>>,

    /// First English description, empty when the feed has none
    pub summary: String,

    /// Base score in `0.0..=10.0` from the newest scoring scheme present
    pub severity_score: Option<f64>,

    /// Verbatim copy of the feed entry
    pub raw_payload: serde_json::Value,
}

impl VulnerabilityRecord {
    /// Create a record carrying only its natural key
    pub fn new(source: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source: source.into(),
            published_at: None,
            last_modified_at: None,
            summary: String::new(),
            severity_score: None,
            raw_payload: serde_json::Value::Null,
        }
    }
}

/// A vendor/product pair affected by a vulnerability.
///
/// Rows are owned by their parent record and replaced wholesale whenever the
/// parent is ingested again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AffectedProduct {
    /// Lower-cased vendor name
    pub vendor: String,

    /// Lower-cased product name
    pub product: String,

    /// Affected version boundary, empty when the feed gives none
    pub version_range: String,
}

impl AffectedProduct {
    pub fn new(
        vendor: impl Into<String>,
        product: impl Into<String>,
        version_range: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            product: product.into(),
            version_range: version_range.into(),
        }
    }
}

/// A record as read back from the store, with its store-assigned identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredVulnerability {
    pub id: Uuid,

    #[serde(flatten)]
    pub record: VulnerabilityRecord,

    pub affected: Vec<AffectedProduct>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}
