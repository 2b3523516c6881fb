//! Record normalization
//!
//! Turns one raw feed entry into a canonical [`VulnerabilityRecord`] plus its
//! affected products. Pure: no I/O, no clock.
//!
//! Only a missing identifier aborts normalization. Every other field degrades
//! to absent/empty when it cannot be interpreted, and the reason is logged at
//! `debug` level.
//!
//! Two entry shapes are accepted: the NVD 2.0 wrapper `{ "cve": { ... } }` and a
//! flattened entry carrying the CVE fields at its top level.

pub mod cpe;
pub mod fields;

use serde_json::Value;
use tracing::debug;
use vulnmon_common::types::{AffectedProduct, VulnerabilityRecord};

use crate::error::{MalformedField, NormalizationError};
use crate::feed::RawEntry;

pub use cpe::{extract_affected, AffectedExtraction};
pub use fields::{CANONICAL_LANGUAGE, SCORE_SCHEMES};

/// Output of a successful normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: VulnerabilityRecord,
    pub affected: Vec<AffectedProduct>,
}

/// Normalize `entry`, tagging the record with `source`
pub fn normalize(entry: &RawEntry, source: &str) -> Result<Normalized, NormalizationError> {
    let value = &without_nul(entry.as_value());
    let body = cve_body(value);

    let source_id =
        fields::extract_identifier(body).ok_or(NormalizationError::MissingIdentifier)?;

    let published_at = or_absent(&source_id, fields::extract_timestamp(body, "published"));
    let last_modified_at =
        or_absent(&source_id, fields::extract_timestamp(body, "lastModified"));
    let summary = or_absent(&source_id, fields::extract_summary(body)).unwrap_or_default();
    let severity_score = or_absent(&source_id, fields::extract_severity(body));

    let extraction = extract_affected(configurations(value, body));
    for issue in &extraction.skipped {
        debug!(cve_id = %source_id, issue = %issue, "Skipped affected-product match");
    }

    Ok(Normalized {
        record: VulnerabilityRecord {
            source_id,
            source: source.to_string(),
            published_at,
            last_modified_at,
            summary,
            severity_score,
            raw_payload: value.clone(),
        },
        affected: extraction.products,
    })
}

/// Copy of `value` with every U+0000 removed from strings and keys.
///
/// PostgreSQL `TEXT` and `JSONB` cannot store NUL, so one stray character in a
/// description would otherwise fail the whole write.
fn without_nul(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.replace('\0', "")),
        Value::Array(items) => Value::Array(items.iter().map(without_nul).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.replace('\0', ""), without_nul(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// The object holding CVE fields for either entry shape
fn cve_body(entry: &Value) -> &Value {
    entry
        .get("cve")
        .filter(|cve| cve.is_object())
        .unwrap_or(entry)
}

/// NVD 2.0 nests configurations in the CVE body, older dumps kept them beside it
fn configurations<'a>(entry: &'a Value, body: &'a Value) -> Option<&'a Value> {
    body.get("configurations")
        .or_else(|| entry.get("configurations"))
}

fn or_absent<T>(source_id: &str, field: Result<Option<T>, MalformedField>) -> Option<T> {
    field.unwrap_or_else(|issue| {
        debug!(cve_id = %source_id, issue = %issue, "Malformed field treated as absent");
        None
    })
}
