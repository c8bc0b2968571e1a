//! Shaping a record set for hand-off: column selection, stable sort and the
//! default export file name.

use std::cmp::Ordering;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use fleetsync_recon::model::{field, Record, RecordSet};
use fleetsync_recon::value::{parse_int, to_text};

use crate::xlsx::MAX_SHEET_NAME;

/// The `[export]` table of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Columns always exported, in order.
    pub columns: Vec<String>,
    /// Rows are sorted by this column (stable, absent last).
    pub sort_by: Option<String>,
    pub sheet_name: String,
    /// File name prefix; the run date is appended.
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            columns: vec!["rnr".into(), "gruppe".into(), "hu".into()],
            sort_by: Some("gruppe".into()),
            sheet_name: "Vehicles".into(),
            file_prefix: "vehicles".into(),
        }
    }
}

#[derive(Deserialize)]
struct ExportTable {
    #[serde(default)]
    export: ExportConfig,
}

impl ExportConfig {
    /// Read the `[export]` table, ignoring the rest of the file.
    pub fn from_toml(input: &str) -> Result<Self, String> {
        let table: ExportTable = toml_from_str(input)?;
        let config = table.export;
        if config.sheet_name.trim().is_empty() {
            return Err("export.sheet_name must not be empty".into());
        }
        if config.sheet_name.chars().count() > MAX_SHEET_NAME {
            return Err(format!("export.sheet_name must be at most {MAX_SHEET_NAME} characters"));
        }
        Ok(config)
    }

    /// Configured columns followed by any extra requested keys, without
    /// duplicates.
    pub fn columns_with(&self, extra: &[String]) -> Vec<String> {
        let mut columns = self.columns.clone();
        for key in extra {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        columns
    }

    /// `<prefix>_<YYYY-MM-DD>.<ext>`
    pub fn file_name(&self, date: NaiveDate, extension: &str) -> String {
        format!("{}_{}.{}", self.file_prefix, date.format("%Y-%m-%d"), extension)
    }
}

fn toml_from_str<T: serde::de::DeserializeOwned>(input: &str) -> Result<T, String> {
    toml::from_str(input).map_err(|e| format!("config parse error: {e}"))
}

/// Output file format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unsupported output format '{}' (expected .xlsx, .csv or .json)",
                if other.is_empty() { "<none>" } else { other }
            )),
        }
    }
}

/// Select, sort and write `set` to `path`, in the format its extension names.
pub fn write_records(
    set: &RecordSet,
    path: &Path,
    config: &ExportConfig,
    extra_keys: &[String],
) -> Result<usize, String> {
    let format = ExportFormat::from_path(path)?;
    let mut shaped = select_columns(set, &config.columns_with(extra_keys));
    if let Some(column) = &config.sort_by {
        sort_by_field(&mut shaped, column);
    }

    match format {
        ExportFormat::Xlsx => crate::xlsx::export(&shaped, path, &config.sheet_name)?,
        ExportFormat::Csv => crate::csv::export(&shaped, path)?,
        ExportFormat::Json => crate::json::export(&shaped, path)?,
    }
    Ok(shaped.len())
}

/// Keep only `wanted` columns that exist in the schema, in `wanted` order.
///
/// Unknown columns are skipped with a warning rather than failing the export.
pub fn select_columns(set: &RecordSet, wanted: &[String]) -> RecordSet {
    let mut columns = Vec::new();
    for name in wanted {
        if set.has_column(name) {
            columns.push(name.clone());
        } else {
            log::warn!("export: no column '{name}', skipped");
        }
    }

    let records = set
        .records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| (c.clone(), field(record, c).clone()))
                .collect::<Record>()
        })
        .collect();

    RecordSet::new(columns, records)
}

/// Stable sort by one column. Integers order numerically, everything else
/// by text; absent values sort last.
pub fn sort_by_field(set: &mut RecordSet, column: &str) {
    set.records
        .sort_by(|a, b| compare_values(field(a, column), field(b, column)));
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    match (parse_int(a), parse_int(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => to_text(a).cmp(&to_text(b)),
    }
}
