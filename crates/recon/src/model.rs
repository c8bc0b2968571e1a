use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::value::NULL;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One entity: field name → value, in insertion order.
pub type Record = Map<String, Value>;

/// Read a field, treating a missing field as absent.
pub fn field<'a>(record: &'a Record, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&NULL)
}

/// Ordered records plus their schema.
///
/// `columns` is the authoritative field list: a CSV header or the union of
/// JSON object keys. Records may omit columns; omitted fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut set = Self { columns: Vec::with_capacity(columns.len()), records };
        for column in columns {
            set.push_column(&column);
        }
        set
    }

    /// Build from records alone; the schema is every key in first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, records }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Append a column to the schema unless already present.
    pub fn push_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// Counters from the join/reconcile stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeStats {
    pub matched: usize,
    pub left_only: usize,
    pub right_only: usize,
    /// Rows whose key value was absent; passed through unjoined.
    pub unkeyed: usize,
    /// Shared-field resolutions by rule name.
    pub resolutions: BTreeMap<String, usize>,
}

/// Counters from the enrichment stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichStats {
    pub attempted: usize,
    pub resolved: usize,
    pub failed: usize,
    /// Rows without a label id; no lookup made.
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub merged_rows: usize,
    pub matched: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub unkeyed: usize,
    pub dropped_missing_required: usize,
    pub output_rows: usize,
    pub resolutions: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub key_field: String,
    pub required_field: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub records: RecordSet,
}
