//! Affected-product extraction from CPE match criteria
//!
//! NVD nests applicability statements as
//! `configurations[] -> nodes[] -> cpeMatch[]`, where each match carries a CPE
//! 2.3 string such as `cpe:2.3:a:vendor:product:1.0:*:*:*:*:*:*:*`.

use serde_json::Value;
use vulnmon_common::types::AffectedProduct;

use crate::error::MalformedField;

/// Minimum number of `:` separated segments needed to reach the product
const MIN_CRITERIA_SEGMENTS: usize = 5;
const VENDOR_SEGMENT: usize = 3;
const PRODUCT_SEGMENT: usize = 4;

/// Keys consulted, in order, for the affected version boundary
const VERSION_RANGE_KEYS: [&str; 2] = ["versionStartIncluding", "versionEndIncluding"];

/// Products extracted from one entry, plus everything that had to be skipped
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AffectedExtraction {
    pub products: Vec<AffectedProduct>,
    pub skipped: Vec<MalformedField>,
}

impl AffectedExtraction {
    fn skip(&mut self, issue: MalformedField) {
        self.skipped.push(issue);
    }
}

/// Walk a configurations section and collect affected products in source order.
///
/// A malformed container contributes no rows; a malformed match is skipped
/// while its siblings are still extracted. Never fails.
pub fn extract_affected(configurations: Option<&Value>) -> AffectedExtraction {
    let mut out = AffectedExtraction::default();

    let Some(configurations) = configurations else {
        return out;
    };
    let Some(groups) = configurations.as_array() else {
        out.skip(MalformedField::wrong_type("configurations", "array"));
        return out;
    };

    for group in groups {
        let Some(nodes) = child_array(group, "nodes", &mut out) else {
            continue;
        };
        for node in nodes {
            let Some(matches) = child_array(node, "cpeMatch", &mut out) else {
                continue;
            };
            for cpe_match in matches {
                match parse_match(cpe_match) {
                    Ok(product) => out.products.push(product),
                    Err(issue) => out.skip(issue),
                }
            }
        }
    }

    out
}

/// Array under `key`, absent key meaning "nothing here"
fn child_array<'a>(
    parent: &'a Value,
    key: &'static str,
    out: &mut AffectedExtraction,
) -> Option<&'a Vec<Value>> {
    match parent.get(key) {
        None => None,
        Some(value) => match value.as_array() {
            Some(items) => Some(items),
            None => {
                out.skip(MalformedField::wrong_type(key, "array"));
                None
            },
        },
    }
}

fn parse_match(cpe_match: &Value) -> Result<AffectedProduct, MalformedField> {
    let criteria = cpe_match
        .get("criteria")
        .and_then(Value::as_str)
        .ok_or_else(|| MalformedField::wrong_type("criteria", "string"))?;

    let (vendor, product) = split_criteria(criteria)?;

    Ok(AffectedProduct {
        vendor,
        product,
        version_range: version_range(cpe_match),
    })
}

/// Split a criteria string into lower-cased `(vendor, product)`
pub fn split_criteria(criteria: &str) -> Result<(String, String), MalformedField> {
    let parts: Vec<&str> = criteria.split(':').collect();
    if parts.len() < MIN_CRITERIA_SEGMENTS {
        return Err(MalformedField::TooFewSegments {
            criteria: criteria.to_string(),
            segments: parts.len(),
        });
    }

    Ok((
        parts[VENDOR_SEGMENT].to_lowercase(),
        parts[PRODUCT_SEGMENT].to_lowercase(),
    ))
}

fn version_range(cpe_match: &Value) -> String {
    VERSION_RANGE_KEYS
        .iter()
        .filter_map(|key| cpe_match.get(*key).and_then(Value::as_str))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}
