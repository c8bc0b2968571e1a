//! Post-merge stages: required-field filter, then per-record label color
//! enrichment.

use std::fmt;

use serde_json::Value;

use crate::error::ReconError;
use crate::model::{field, EnrichStats, RecordSet};
use crate::value::canonical_id;

// ---------------------------------------------------------------------------
// Lookup seam
// ---------------------------------------------------------------------------

/// Why a single label lookup produced no color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    pub label_id: String,
    pub reason: String,
}

impl LookupError {
    pub fn new(label_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label_id: label_id.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label '{}': {}", self.label_id, self.reason)
    }
}

impl std::error::Error for LookupError {}

/// Resolves a label identifier to its color code.
pub trait LabelLookup {
    fn resolve_color(&self, label_id: &str) -> Result<String, LookupError>;
}

impl<F> LabelLookup for F
where
    F: Fn(&str) -> Result<String, LookupError>,
{
    fn resolve_color(&self, label_id: &str) -> Result<String, LookupError> {
        self(label_id)
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Drop every record whose `required` field is absent.
///
/// Returns the kept records and the number dropped. Kept records are not
/// touched.
pub fn filter_required(set: RecordSet, required: &str) -> Result<(RecordSet, usize), ReconError> {
    if !set.has_column(required) {
        return Err(ReconError::MissingColumn {
            column: required.into(),
        });
    }

    let RecordSet { columns, records } = set;
    let before = records.len();
    let kept: Vec<_> = records
        .into_iter()
        .filter(|record| !field(record, required).is_null())
        .collect();
    let dropped = before - kept.len();

    log::info!("required field '{required}': kept {}, dropped {dropped}", kept.len());
    Ok((RecordSet { columns, records: kept }, dropped))
}

/// Attach `target` to every record, resolved from the record's `label_field`.
///
/// One lookup per record that carries a label id, in record order. A failed
/// lookup leaves that record's color absent and the run continues.
pub fn enrich(
    mut set: RecordSet,
    label_field: &str,
    target: &str,
    lookup: &dyn LabelLookup,
) -> (RecordSet, EnrichStats) {
    let mut stats = EnrichStats::default();
    let has_labels = set.has_column(label_field);
    if !has_labels {
        log::warn!("no '{label_field}' column; every '{target}' left empty");
    }

    set.push_column(target);

    for record in &mut set.records {
        let label_id = if has_labels {
            canonical_id(field(record, label_field))
        } else {
            None
        };

        let color = match label_id {
            None => {
                stats.skipped += 1;
                Value::Null
            }
            Some(label_id) => {
                stats.attempted += 1;
                match lookup.resolve_color(&label_id) {
                    Ok(color) => {
                        stats.resolved += 1;
                        Value::String(color)
                    }
                    Err(e) => {
                        stats.failed += 1;
                        log::warn!("color lookup failed: {e}");
                        Value::Null
                    }
                }
            }
        };

        record.insert(target.to_string(), color);
    }

    log::info!(
        "label colors: {} resolved, {} failed, {} without label",
        stats.resolved,
        stats.failed,
        stats.skipped,
    );

    (set, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use serde_json::json;
    use std::cell::RefCell;

    fn set(value: Value) -> RecordSet {
        let records: Vec<Record> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        RecordSet::from_records(records)
    }

    #[test]
    fn filter_drops_absent_keeps_present() {
        let input = set(json!([
            {"id": 1, "hu": "2024-01-01"},
            {"id": 2, "hu": null},
            {"id": 3},
            {"id": 4, "hu": ""},
        ]));
        let (kept, dropped) = filter_required(input, "hu").unwrap();

        let ids: Vec<&Value> = kept.records.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec![&json!(1), &json!(4)]);
        assert_eq!(dropped, 2);
        assert_eq!(kept.columns, vec!["id", "hu"]);
    }

    #[test]
    fn filter_without_column_is_structural() {
        let input = set(json!([{"id": 1}]));
        let err = filter_required(input, "hu").unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { ref column } if column == "hu"));
    }

    #[test]
    fn enrich_isolates_failures() {
        let input = set(json!([
            {"id": 1, "labelIds": "76"},
            {"id": 2, "labelIds": "13"},
            {"id": 3, "labelIds": 77.0},
        ]));
        let lookup = |label: &str| -> Result<String, LookupError> {
            match label {
                "13" => Err(LookupError::new(label, "connection reset")),
                other => Ok(format!("#{other}{other}{other}")),
            }
        };
        let (out, stats) = enrich(input, "labelIds", "resolved_colorCode", &lookup);

        assert_eq!(out.records[0]["resolved_colorCode"], json!("#767676"));
        assert!(out.records[1]["resolved_colorCode"].is_null());
        assert_eq!(out.records[2]["resolved_colorCode"], json!("#777777"));
        assert_eq!(out.records[1]["labelIds"], json!("13"));
        assert_eq!(stats, EnrichStats { attempted: 3, resolved: 2, failed: 1, skipped: 0 });
    }

    #[test]
    fn enrich_skips_records_without_label() {
        let calls = RefCell::new(Vec::new());
        let lookup = |label: &str| -> Result<String, LookupError> {
            calls.borrow_mut().push(label.to_string());
            Ok("#000000".into())
        };
        let input = set(json!([
            {"id": 1, "labelIds": null},
            {"id": 2, "labelIds": "5"},
            {"id": 3, "labelIds": " "},
        ]));
        let (out, stats) = enrich(input, "labelIds", "resolved_colorCode", &lookup);

        assert_eq!(*calls.borrow(), vec!["5".to_string()]);
        assert!(out.records[0]["resolved_colorCode"].is_null());
        assert_eq!(out.records[1]["resolved_colorCode"], json!("#000000"));
        assert_eq!(stats.skipped, 2);
        assert_eq!(out.columns, vec!["id", "labelIds", "resolved_colorCode"]);
    }

    #[test]
    fn enrich_without_label_column_makes_no_lookups() {
        let lookup = |_: &str| -> Result<String, LookupError> { panic!("no lookup expected") };
        let input = set(json!([{"id": 1}, {"id": 2}]));
        let (out, stats) = enrich(input, "labelIds", "resolved_colorCode", &lookup);

        assert_eq!(stats.attempted, 0);
        assert_eq!(stats.skipped, 2);
        assert!(out.records.iter().all(|r| r["resolved_colorCode"].is_null()));
    }

    #[test]
    fn enrich_overwrites_existing_target_column() {
        let lookup = |_: &str| -> Result<String, LookupError> { Ok("#fff".into()) };
        let input = set(json!([{"labelIds": 1, "resolved_colorCode": "stale"}]));
        let (out, _) = enrich(input, "labelIds", "resolved_colorCode", &lookup);

        assert_eq!(out.columns, vec!["labelIds", "resolved_colorCode"]);
        assert_eq!(out.records[0]["resolved_colorCode"], json!("#fff"));
    }
}
