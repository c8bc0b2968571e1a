// Excel import/export

use std::path::Path;

use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader, Sheets};
use chrono::NaiveTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::{Number, Value};

use fleetsync_recon::model::{field, Record, RecordSet};
use fleetsync_recon::value::to_text;

/// Sheet names are capped by Excel.
pub const MAX_SHEET_NAME: usize = 31;

/// Export a record set as a single sheet: a bold header row, then one row per
/// record. Numbers stay numeric and absent values are left blank.
pub fn export(set: &RecordSet, path: &Path, sheet_name: &str) -> Result<(), String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

    write_sheet(worksheet, set)?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    log::info!("xlsx: wrote {} row(s) to {}", set.len(), path.display());
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, set: &RecordSet) -> Result<(), String> {
    let header = Format::new().set_bold();

    for (col, name) in set.columns.iter().enumerate() {
        let col16 = col_index(col)?;
        worksheet
            .write_string_with_format(0, col16, name, &header)
            .map_err(|e| format!("Failed to write header '{}': {}", name, e))?;
    }

    for (idx, record) in set.records.iter().enumerate() {
        let row32 = u32::try_from(idx + 1).map_err(|_| "too many rows for XLSX".to_string())?;
        for (col, name) in set.columns.iter().enumerate() {
            let col16 = col_index(col)?;
            write_value(worksheet, row32, col16, field(record, name))
                .map_err(|e| format!("Failed to write cell ({}, {}): {}", idx + 1, col, e))?;
        }
    }

    if !set.columns.is_empty() {
        worksheet
            .set_freeze_panes(1, 0)
            .map_err(|e| format!("Failed to freeze header: {}", e))?;
    }
    worksheet.autofit();
    Ok(())
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, s)?;
        }
        other => {
            worksheet.write_string(row, col, to_text(other).as_ref())?;
        }
    }
    Ok(())
}

fn col_index(col: usize) -> Result<u16, String> {
    u16::try_from(col).map_err(|_| "too many columns for XLSX".to_string())
}

/// Import the first sheet of an Excel file (xlsx, xls, xlsb, ods).
/// The first row is the schema.
pub fn import(path: &Path) -> Result<RecordSet, String> {
    import_sheet(path, None)
}

/// Import a named sheet, or the first one when `sheet` is `None`.
pub fn import_sheet(path: &Path, sheet: Option<&str>) -> Result<RecordSet, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(format!("sheet '{}': missing header row", sheet_name));
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_value(cell).map(|v| to_text(&v).trim().to_string()).unwrap_or_default())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(format!("sheet '{}': missing header row", sheet_name));
    }

    let records: Vec<Record> = rows
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, name)| !name.is_empty())
                .map(|(idx, name)| {
                    let value = row.get(idx).and_then(cell_to_value).unwrap_or(Value::Null);
                    (name.clone(), value)
                })
                .collect()
        })
        .collect();

    let columns = headers.into_iter().filter(|h| !h.is_empty()).collect();
    log::debug!("xlsx: sheet '{}', {} row(s)", sheet_name, records.len());
    Ok(RecordSet::new(columns, records))
}

fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(n) => Some(Value::from(*n)),
        // Integers without decimals
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(Value::from(*n as i64)),
        Data::Float(n) => Number::from_f64(*n).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => date_cell_to_value(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(e) => Some(Value::String(format!("#{:?}", e))),
    }
}

/// Date cells become ISO text: `YYYY-MM-DD` for whole days, otherwise
/// `YYYY-MM-DDTHH:MM:SS`. Durations stay numeric.
fn date_cell_to_value(dt: &ExcelDateTime) -> Option<Value> {
    if dt.is_duration() {
        return Number::from_f64(dt.as_f64()).map(Value::Number);
    }
    match dt.as_datetime() {
        Some(datetime) if datetime.time() == NaiveTime::MIN => {
            Some(Value::String(datetime.format("%Y-%m-%d").to_string()))
        }
        Some(datetime) => Some(Value::String(datetime.format("%Y-%m-%dT%H:%M:%S").to_string())),
        None => Number::from_f64(dt.as_f64()).map(Value::Number),
    }
}
