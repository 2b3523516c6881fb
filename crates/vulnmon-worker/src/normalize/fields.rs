//! Scalar field extractors
//!
//! Each extractor reports a present value, an absent one (`Ok(None)`), or a
//! [`MalformedField`] describing why the value could not be used.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::MalformedField;

/// Language tag of the description that becomes the summary
pub const CANONICAL_LANGUAGE: &str = "en";

/// Scoring scheme keys under `metrics`, newest first
pub const SCORE_SCHEMES: [&str; 4] = [
    "cvssMetricV40",
    "cvssMetricV31",
    "cvssMetricV30",
    "cvssMetricV2",
];

const MAX_SCORE: f64 = 10.0;

/// Trimmed, non-empty `id` of the CVE body
pub fn extract_identifier(body: &Value) -> Option<String> {
    body.get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Timestamp stored under `field`
pub fn extract_timestamp(
    body: &Value,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, MalformedField> {
    let raw = match body.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value
            .as_str()
            .ok_or_else(|| MalformedField::wrong_type(field, "string"))?,
    };

    if raw.trim().is_empty() {
        return Ok(None);
    }

    parse_timestamp(raw).map(Some).ok_or_else(|| MalformedField::Timestamp {
        field,
        value: raw.to_string(),
    })
}

/// Parse an ISO-8601 timestamp; values without an offset are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    // NVD publishes "2024-01-31T18:15:47.020" with no offset
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Value of the first description in the canonical language
pub fn extract_summary(body: &Value) -> Result<Option<String>, MalformedField> {
    let Some(descriptions) = body.get("descriptions") else {
        return Ok(None);
    };
    let descriptions = descriptions
        .as_array()
        .ok_or_else(|| MalformedField::wrong_type("descriptions", "array"))?;

    let Some(english) = descriptions
        .iter()
        .find(|d| d.get("lang").and_then(Value::as_str) == Some(CANONICAL_LANGUAGE))
    else {
        return Ok(None);
    };

    match english.get("value") {
        None | Some(Value::Null) => Ok(Some(String::new())),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| MalformedField::wrong_type("descriptions.value", "string")),
    }
}

/// Base score of the newest scoring scheme present.
///
/// Only the newest scheme is consulted: if it is malformed the score is
/// reported as malformed rather than taken from an older scheme.
pub fn extract_severity(body: &Value) -> Result<Option<f64>, MalformedField> {
    let Some(metrics) = body.get("metrics") else {
        return Ok(None);
    };
    let metrics = metrics
        .as_object()
        .ok_or_else(|| MalformedField::wrong_type("metrics", "object"))?;

    let Some((scheme, entries)) = SCORE_SCHEMES
        .iter()
        .find_map(|scheme| metrics.get(*scheme).map(|entries| (*scheme, entries)))
    else {
        return Ok(None);
    };

    let first = entries
        .as_array()
        .ok_or_else(|| MalformedField::wrong_type(scheme, "array"))?
        .first()
        .ok_or(MalformedField::EmptyScheme { scheme })?;

    let score = first
        .get("cvssData")
        .and_then(|data| data.get("baseScore"))
        .and_then(Value::as_f64)
        .ok_or_else(|| MalformedField::wrong_type(scheme, "numeric cvssData.baseScore"))?;

    if !(0.0..=MAX_SCORE).contains(&score) {
        return Err(MalformedField::ScoreOutOfRange { scheme, score });
    }

    Ok(Some(score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn metric(score: Value) -> Value {
        json!([{ "source": "nvd@nist.gov", "type": "Primary", "cvssData": { "baseScore": score } }])
    }

    #[test]
    fn test_identifier_trimmed_and_required() {
        assert_eq!(extract_identifier(&json!({ "id": " CVE-1 " })), Some("CVE-1".to_string()));
        assert_eq!(extract_identifier(&json!({ "id": "" })), None);
        assert_eq!(extract_identifier(&json!({ "id": 17 })), None);
        assert_eq!(extract_identifier(&json!({})), None);
    }

    #[test]
    fn test_parse_nvd_timestamp_without_offset() {
        let parsed = parse_timestamp("2024-01-31T18:15:47.020").unwrap();
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2024, 1, 31, 18, 15, 47).unwrap()
                + chrono::Duration::milliseconds(20)
        );
    }

    #[test]
    fn test_parse_timestamp_with_offset_converts_to_utc() {
        let parsed = parse_timestamp("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());

        let zulu = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
        assert_eq!(zulu, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let parsed = parse_timestamp("2023-12-25").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_bad_timestamp_is_malformed_not_fatal() {
        let body = json!({ "published": "last tuesday", "lastModified": 12 });
        assert!(matches!(
            extract_timestamp(&body, "published"),
            Err(MalformedField::Timestamp { field: "published", .. })
        ));
        assert!(extract_timestamp(&body, "lastModified").is_err());
        assert_eq!(extract_timestamp(&body, "missing").unwrap(), None);
    }

    #[test]
    fn test_summary_takes_first_english_only() {
        let body = json!({ "descriptions": [
            { "lang": "es", "value": "hola" },
            { "lang": "en", "value": "first" },
            { "lang": "en", "value": "second" }
        ]});
        assert_eq!(extract_summary(&body).unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_summary_absent_without_english() {
        let body = json!({ "descriptions": [
            { "lang": "fr", "value": "bonjour" },
            { "lang": "de", "value": "hallo" }
        ]});
        assert_eq!(extract_summary(&body).unwrap(), None);
        assert_eq!(extract_summary(&json!({})).unwrap(), None);
    }

    #[test]
    fn test_summary_language_match_is_exact() {
        let body = json!({ "descriptions": [{ "lang": "en-US", "value": "close" }] });
        assert_eq!(extract_summary(&body).unwrap(), None);
    }

    #[test]
    fn test_severity_prefers_newest_scheme() {
        let body = json!({ "metrics": {
            "cvssMetricV2": metric(json!(5.0)),
            "cvssMetricV30": metric(json!(6.1)),
            "cvssMetricV31": [
                { "cvssData": { "baseScore": 9.8 } },
                { "cvssData": { "baseScore": 7.0 } }
            ]
        }});
        assert_eq!(extract_severity(&body).unwrap(), Some(9.8));
    }

    #[test]
    fn test_severity_v40_outranks_v31() {
        let body = json!({ "metrics": {
            "cvssMetricV31": metric(json!(7.5)),
            "cvssMetricV40": metric(json!(8.7))
        }});
        assert_eq!(extract_severity(&body).unwrap(), Some(8.7));
    }

    #[test]
    fn test_severity_falls_back_to_v2_when_alone() {
        let body = json!({ "metrics": { "cvssMetricV2": metric(json!(4.3)) } });
        assert_eq!(extract_severity(&body).unwrap(), Some(4.3));
    }

    #[test]
    fn test_malformed_newest_scheme_does_not_fall_back() {
        let body = json!({ "metrics": {
            "cvssMetricV31": [{ "cvssData": {} }],
            "cvssMetricV2": metric(json!(5.0))
        }});
        assert!(extract_severity(&body).is_err());

        let empty = json!({ "metrics": { "cvssMetricV31": [] } });
        assert_eq!(
            extract_severity(&empty),
            Err(MalformedField::EmptyScheme { scheme: "cvssMetricV31" })
        );
    }

    #[test]
    fn test_severity_rejects_out_of_range_and_strings() {
        let high = json!({ "metrics": { "cvssMetricV31": metric(json!(11.0)) } });
        assert!(matches!(
            extract_severity(&high),
            Err(MalformedField::ScoreOutOfRange { .. })
        ));

        let text = json!({ "metrics": { "cvssMetricV31": metric(json!("9.8")) } });
        assert!(extract_severity(&text).is_err());
    }

    #[test]
    fn test_severity_absent_without_metrics() {
        assert_eq!(extract_severity(&json!({})).unwrap(), None);
        assert_eq!(extract_severity(&json!({ "metrics": {} })).unwrap(), None);
    }
}
