// JSON import/export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::Value;

use fleetsync_recon::model::{Record, RecordSet};

/// Load a JSON array of objects.
pub fn import(path: &Path) -> Result<RecordSet, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    import_from_str(&content)
}

pub fn import_from_str(content: &str) -> Result<RecordSet, String> {
    let value: Value = serde_json::from_str(content.trim_start_matches('\u{feff}'))
        .map_err(|e| format!("JSON parse error: {e}"))?;
    records_from_value(value)
}

/// Convert an already-parsed JSON array of objects into a record set.
pub fn records_from_value(value: Value) -> Result<RecordSet, String> {
    let Value::Array(items) = value else {
        return Err("JSON must be an array of objects".into());
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(format!("item {idx}: expected object")),
        })
        .collect::<Result<Vec<Record>, String>>()?;

    Ok(RecordSet::from_records(records))
}

/// Export records as a JSON array of objects, one key per schema column.
pub fn export(set: &RecordSet, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &to_rows(set)).map_err(|e| e.to_string())?;
    Ok(())
}

fn to_rows(set: &RecordSet) -> Vec<Record> {
    set.records
        .iter()
        .map(|record| {
            set.columns
                .iter()
                .map(|c| (c.clone(), record.get(c).cloned().unwrap_or(Value::Null)))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_import_array_of_objects() {
        let set = import_from_str(r#"[{"kurzname":"LKW-01","rnr":1001},{"kurzname":"LKW-02","hu":"2025-01-01"}]"#)
            .unwrap();
        assert_eq!(set.columns, vec!["kurzname", "rnr", "hu"]);
        assert_eq!(set.records[0]["rnr"], json!(1001));
    }

    #[test]
    fn test_import_rejects_non_array() {
        let err = import_from_str(r#"{"kurzname":"LKW-01"}"#).unwrap_err();
        assert!(err.contains("array of objects"));
    }

    #[test]
    fn test_import_rejects_scalar_items() {
        let err = import_from_str(r#"[{"a":1}, 2]"#).unwrap_err();
        assert_eq!(err, "item 1: expected object");
    }

    #[test]
    fn test_json_export_fills_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let set = RecordSet::new(
            vec!["kurzname".into(), "hu".into()],
            vec![json!({"kurzname": "LKW-01"}).as_object().cloned().unwrap()],
        );

        export(&set, &path).unwrap();

        let parsed: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, json!([{"kurzname": "LKW-01", "hu": null}]));
    }
}
