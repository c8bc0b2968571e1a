use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::ReconError;
use crate::model::{field, MergeStats, Record, RecordSet};
use crate::reconcile::Reconciler;
use crate::value::{canonical_id, NULL};

/// Merged records plus join/reconcile counters.
#[derive(Debug)]
pub struct MergeOutput {
    pub records: RecordSet,
    pub stats: MergeStats,
}

/// Records of one input, indexed by canonical key.
struct KeyedInput<'a> {
    by_key: BTreeMap<String, &'a Record>,
    unkeyed: Vec<&'a Record>,
}

fn index_input<'a>(
    input_name: &str,
    set: &'a RecordSet,
    key_field: &str,
) -> Result<KeyedInput<'a>, ReconError> {
    if !set.has_column(key_field) {
        return Err(ReconError::MissingKeyField {
            input: input_name.into(),
            field: key_field.into(),
        });
    }

    let mut by_key = BTreeMap::new();
    let mut unkeyed = Vec::new();

    for record in &set.records {
        match canonical_id(field(record, key_field)) {
            Some(key) => {
                if by_key.insert(key.clone(), record).is_some() {
                    return Err(ReconError::DuplicateKey {
                        input: input_name.into(),
                        key,
                    });
                }
            }
            None => unkeyed.push(record),
        }
    }

    if !unkeyed.is_empty() {
        log::warn!(
            "{input_name} input: {} record(s) without '{key_field}' cannot be joined",
            unkeyed.len()
        );
    }

    Ok(KeyedInput { by_key, unkeyed })
}

/// How a schema column is filled in a merged record.
enum ColumnSource {
    Key,
    Shared,
    LeftOnly,
    RightOnly,
}

/// Full outer join of two record sets on `key_field`.
///
/// Columns present in both inputs are reconciled into one; columns unique
/// to one input pass through. Keyed rows come out in key order, followed by
/// rows with no key value (left input first).
pub fn merge_record_sets(
    left: &RecordSet,
    right: &RecordSet,
    key_field: &str,
    reconciler: &Reconciler,
) -> Result<MergeOutput, ReconError> {
    let left_input = index_input("left", left, key_field)?;
    let right_input = index_input("right", right, key_field)?;

    let mut columns: Vec<(String, ColumnSource)> = Vec::new();
    for column in &left.columns {
        let source = if column == key_field {
            ColumnSource::Key
        } else if right.has_column(column) {
            ColumnSource::Shared
        } else {
            ColumnSource::LeftOnly
        };
        columns.push((column.clone(), source));
    }
    for column in &right.columns {
        if !left.has_column(column) {
            columns.push((column.clone(), ColumnSource::RightOnly));
        }
    }

    let mut stats = MergeStats::default();
    let mut records = Vec::new();

    let keys: BTreeSet<&String> = left_input
        .by_key
        .keys()
        .chain(right_input.by_key.keys())
        .collect();

    for key in keys {
        let l = left_input.by_key.get(key).copied();
        let r = right_input.by_key.get(key).copied();
        match (l, r) {
            (Some(_), Some(_)) => stats.matched += 1,
            (Some(_), None) => stats.left_only += 1,
            _ => stats.right_only += 1,
        }
        records.push(merge_pair(&columns, l, r, reconciler, &mut stats));
    }

    for record in left_input.unkeyed.iter().copied() {
        stats.unkeyed += 1;
        records.push(merge_pair(&columns, Some(record), None, reconciler, &mut stats));
    }
    for record in right_input.unkeyed.iter().copied() {
        stats.unkeyed += 1;
        records.push(merge_pair(&columns, None, Some(record), reconciler, &mut stats));
    }

    log::info!(
        "merged {} row(s): {} matched, {} left only, {} right only, {} unkeyed",
        records.len(),
        stats.matched,
        stats.left_only,
        stats.right_only,
        stats.unkeyed,
    );

    let column_names = columns.into_iter().map(|(name, _)| name).collect();
    Ok(MergeOutput {
        records: RecordSet::new(column_names, records),
        stats,
    })
}

fn merge_pair(
    columns: &[(String, ColumnSource)],
    left: Option<&Record>,
    right: Option<&Record>,
    reconciler: &Reconciler,
    stats: &mut MergeStats,
) -> Record {
    let mut merged = Record::new();
    for (name, source) in columns {
        let value = match source {
            ColumnSource::Key => {
                let value = side_value(left, name);
                if value.is_null() { side_value(right, name).clone() } else { value.clone() }
            }
            ColumnSource::Shared => {
                let (value, rule) =
                    reconciler.resolve_with_rule(name, side_value(left, name), side_value(right, name));
                *stats.resolutions.entry(rule.to_string()).or_insert(0) += 1;
                value
            }
            ColumnSource::LeftOnly => side_value(left, name).clone(),
            ColumnSource::RightOnly => side_value(right, name).clone(),
        };
        merged.insert(name.clone(), value);
    }
    merged
}

fn side_value<'a>(side: Option<&'a Record>, name: &str) -> &'a Value {
    side.map(|r| field(r, name)).unwrap_or(&NULL)
}
