//! Decoding of upstream report payloads.
//!
//! The item report is decoded row by row. A row that cannot be turned into a
//! [`PerformanceItem`] is skipped and recorded, and the rest of the report is
//! still analysed.

use serde_json::{Map, Value};

use crate::error::{CreativeError, Result};
use crate::types::{CohortMedians, PerformanceItem, SkippedRow};

/// Outcome of decoding an item report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedReport {
    pub items: Vec<PerformanceItem>,
    pub skipped: Vec<SkippedRow>,
}

/// Decode `{ "items": [...] }`, or a bare array of rows.
pub fn decode_report(payload: &Value) -> Result<DecodedReport> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(obj) => match obj.get("items") {
            Some(Value::Array(rows)) => rows,
            Some(Value::Null) | None => {
                return Err(CreativeError::MalformedReport("missing `items` array".into()))
            }
            Some(other) => {
                return Err(CreativeError::MalformedReport(format!(
                    "`items` is {}, expected an array",
                    kind(other)
                )))
            }
        },
        other => {
            return Err(CreativeError::MalformedReport(format!(
                "report is {}, expected an object",
                kind(other)
            )))
        }
    };

    let mut decoded = DecodedReport::default();
    for (index, row) in rows.iter().enumerate() {
        match decode_row(row) {
            Ok(item) => decoded.items.push(item),
            Err(e) => {
                let item_id = row.get("itemId").and_then(id_string);
                tracing::warn!(index, item_id = ?item_id, error = %e, "skipping report row");
                decoded.skipped.push(SkippedRow {
                    index,
                    item_id,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(decoded)
}

/// Decode one report row.
pub fn decode_row(row: &Value) -> Result<PerformanceItem> {
    let Value::Object(obj) = row else {
        return Err(CreativeError::MalformedRow(format!(
            "row is {}, expected an object",
            kind(row)
        )));
    };

    let item_id = obj
        .get("itemId")
        .and_then(id_string)
        .ok_or_else(|| CreativeError::MalformedRow("missing itemId".into()))?;

    // Anything that is not a string is treated as an empty headline.
    let headline = obj
        .get("headline")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(PerformanceItem {
        item_id,
        headline,
        ctr: row_metric(obj, "ctr")?,
        cvr: row_metric(obj, "cvr")?,
        roas: row_optional_metric(obj, "roas")?,
        cpa: row_optional_metric(obj, "cpa")?,
    })
}

/// Decode `{ "medians": { "ctr", "cvr" } }`, or the bare medians object.
pub fn decode_medians(payload: &Value) -> Result<CohortMedians> {
    let inner = payload.get("medians").unwrap_or(payload);
    let Value::Object(obj) = inner else {
        return Err(CreativeError::MalformedReport(format!(
            "medians is {}, expected an object",
            kind(inner)
        )));
    };
    let metric = |field: &str| {
        required_metric(obj, field).map_err(|e| CreativeError::MalformedReport(format!("medians {e}")))
    };
    Ok(CohortMedians {
        ctr: metric("ctr")?,
        cvr: metric("cvr")?,
    })
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn row_metric(obj: &Map<String, Value>, field: &str) -> Result<f64> {
    required_metric(obj, field).map_err(CreativeError::MalformedRow)
}

fn row_optional_metric(obj: &Map<String, Value>, field: &str) -> Result<Option<f64>> {
    optional_metric(obj, field).map_err(CreativeError::MalformedRow)
}

// Metric helpers return a bare message; callers pick the error variant.
fn required_metric(obj: &Map<String, Value>, field: &str) -> std::result::Result<f64, String> {
    optional_metric(obj, field)?.ok_or_else(|| format!("missing {field}"))
}

fn optional_metric(
    obj: &Map<String, Value>,
    field: &str,
) -> std::result::Result<Option<f64>, String> {
    let value = match obj.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(format!(
            "{field} must be a non-negative number, got {}",
            obj.get(field).map(Value::to_string).unwrap_or_default()
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn well_formed_rows_decode() {
        let report = decode_report(&json!({
            "items": [
                { "itemId": "a1", "headline": "Save Today", "ctr": 3.5, "cvr": 0.04, "roas": 1.5, "cpa": 15 },
                { "itemId": "a2", "headline": "Plain", "ctr": "1.2", "cvr": "0.01" }
            ]
        }))
        .unwrap();

        assert!(report.skipped.is_empty());
        assert_eq!(
            report.items[0],
            PerformanceItem::new("a1", "Save Today", 3.5, 0.04)
                .with_roas(1.5)
                .with_cpa(15.0)
        );
        assert_eq!(report.items[1].ctr, 1.2);
        assert_eq!(report.items[1].roas, None);
    }

    #[test]
    fn bad_rows_are_skipped_not_fatal() {
        let report = decode_report(&json!({
            "items": [
                { "itemId": "ok", "headline": "Fine", "ctr": 1, "cvr": 0.02 },
                { "headline": "No id", "ctr": 1, "cvr": 0.02 },
                { "itemId": "neg", "ctr": -1, "cvr": 0.02 },
                { "itemId": "text", "ctr": "lots", "cvr": 0.02 },
                "not an object",
                { "itemId": 42, "ctr": 2, "cvr": 0.03, "cpa": true }
            ]
        }))
        .unwrap();

        assert_eq!(report.items.len(), 1);
        let skipped: Vec<_> = report
            .skipped
            .iter()
            .map(|s| (s.index, s.item_id.as_deref()))
            .collect();
        assert_eq!(
            skipped,
            vec![(1, None), (2, Some("neg")), (3, Some("text")), (4, None), (5, Some("42"))]
        );
        assert!(report.skipped[1].error.contains("ctr"));
    }

    #[test]
    fn non_string_headline_becomes_empty() {
        let item = decode_row(&json!({ "itemId": "h", "headline": 7, "ctr": 1, "cvr": 0 })).unwrap();
        assert_eq!(item.headline, "");
        let item = decode_row(&json!({ "itemId": "h", "ctr": 1, "cvr": 0 })).unwrap();
        assert_eq!(item.headline, "");
    }

    #[test]
    fn bare_array_is_accepted() {
        let report = decode_report(&json!([{ "itemId": "x", "ctr": 1, "cvr": 0.1 }])).unwrap();
        assert_eq!(report.items.len(), 1);
    }

    #[test]
    fn envelope_without_items_is_rejected() {
        assert!(matches!(
            decode_report(&json!({ "rows": [] })),
            Err(CreativeError::MalformedReport(_))
        ));
        assert!(matches!(
            decode_report(&json!({ "items": "nope" })),
            Err(CreativeError::MalformedReport(_))
        ));
    }

    #[test]
    fn medians_decode_from_envelope_or_bare() {
        let wrapped = decode_medians(&json!({ "medians": { "ctr": 2.0, "cvr": 0.03 } })).unwrap();
        assert_eq!(wrapped, CohortMedians { ctr: 2.0, cvr: 0.03 });
        let bare = decode_medians(&json!({ "ctr": "2", "cvr": 0.03 })).unwrap();
        assert_eq!(bare, wrapped);
        assert!(decode_medians(&json!({ "medians": { "ctr": 2.0 } })).is_err());
    }

    #[test]
    fn medians_errors_name_the_field_once() {
        let err = decode_medians(&json!({ "medians": { "ctr": 2.0 } })).unwrap_err();
        assert!(matches!(err, CreativeError::MalformedReport(_)));
        assert_eq!(err.to_string(), "malformed report: medians missing cvr");

        let err = decode_medians(&json!({ "medians": { "ctr": -1, "cvr": 0.03 } })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed report: medians ctr must be a non-negative number, got -1"
        );
    }

    #[test]
    fn row_errors_keep_the_row_prefix() {
        let err = decode_row(&json!({ "itemId": "r", "ctr": 1 })).unwrap_err();
        assert_eq!(err.to_string(), "malformed report row: missing cvr");
    }
}
