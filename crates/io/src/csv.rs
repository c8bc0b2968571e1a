// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use fleetsync_recon::model::{field, Record, RecordSet};
use fleetsync_recon::value::to_text;

/// Load a delimited file with a header row. The delimiter is sniffed.
pub fn import(path: &Path) -> Result<RecordSet, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

/// Load a delimited file with a known delimiter.
pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<RecordSet, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header's field count, weighted by that count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| format!("{}: {e}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel-exported CSVs are commonly Windows-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text. The first row is the schema; empty cells are absent.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<RecordSet, String> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err("missing header row".into());
    }

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result.map_err(|e| format!("line {}: {e}", row_idx + 2))?;
        let mut record = Record::new();
        for (col_idx, name) in headers.iter().enumerate() {
            let value = match row.get(col_idx) {
                Some(cell) if !cell.is_empty() => Value::String(cell.to_string()),
                _ => Value::Null,
            };
            record.insert(name.clone(), value);
        }
        records.push(record);
    }

    log::debug!("csv: {} column(s), {} row(s)", headers.len(), records.len());
    Ok(RecordSet::new(headers, records))
}

pub fn export(set: &RecordSet, path: &Path) -> Result<(), String> {
    export_with_delimiter(set, path, b',')
}

pub fn export_with_delimiter(set: &RecordSet, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer.write_record(&set.columns).map_err(|e| e.to_string())?;
    for record in &set.records {
        let row: Vec<String> = set
            .columns
            .iter()
            .map(|c| to_text(field(record, c)).into_owned())
            .collect();
        writer.write_record(&row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
