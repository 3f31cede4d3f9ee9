use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use polars::prelude::*;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Inferred storage type of one CSV column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnHint {
    /// Every non-missing cell parses as a number.
    pub is_numeric: bool,
    /// Every non-missing cell parses as an integer.
    pub is_integer: bool,
    pub null_ratio: f64,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Cell spellings treated as missing, matching what common CSV exporters write.
fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ["na", "nan", "n/a", "null", "none", "nat"]
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    let mut rows = raw_rows.into_iter();
    let Some(header_row) = rows.next() else {
        return Ok(CsvTable {
            headers: Vec::new(),
            rows: Vec::new(),
        });
    };
    // pandas writes its row index as a leading column without a name
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let header = normalize_header(value);
            if header.is_empty() {
                format!("unnamed_{idx}")
            } else {
                header
            }
        })
        .collect();
    let rows = rows
        .map(|record| {
            (0..headers.len())
                .map(|idx| record.get(idx).map(String::as_str).unwrap_or("").to_string())
                .collect()
        })
        .collect();
    Ok(CsvTable { headers, rows })
}

pub fn build_column_hints(table: &CsvTable) -> BTreeMap<String, ColumnHint> {
    let mut hints = BTreeMap::new();
    let row_count = table.rows.len();
    for (col_idx, header) in table.headers.iter().enumerate() {
        let mut non_null = 0usize;
        let mut numeric = 0usize;
        let mut integer = 0usize;
        for row in &table.rows {
            let value = row.get(col_idx).map(String::as_str).unwrap_or("");
            if is_missing(value) {
                continue;
            }
            non_null += 1;
            let trimmed = value.trim();
            if trimmed.parse::<i64>().is_ok() {
                integer += 1;
                numeric += 1;
            } else if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
                numeric += 1;
            }
        }
        let null_ratio = if row_count == 0 {
            1.0
        } else {
            (row_count.saturating_sub(non_null)) as f64 / row_count as f64
        };
        hints.insert(
            header.clone(),
            ColumnHint {
                is_numeric: non_null > 0 && numeric == non_null,
                is_integer: non_null > 0 && integer == non_null,
                null_ratio,
            },
        );
    }
    hints
}

/// Builds a typed frame: integer columns become Int64, other numeric columns
/// Float64, everything else String. Missing cells are nulls.
pub fn table_to_dataframe(table: &CsvTable) -> Result<DataFrame> {
    let hints = build_column_hints(table);
    let mut columns: Vec<Column> = Vec::with_capacity(table.headers.len());
    for (col_idx, header) in table.headers.iter().enumerate() {
        let cells = table.rows.iter().map(|row| {
            let value = row.get(col_idx).map(String::as_str).unwrap_or("");
            if is_missing(value) { None } else { Some(value.trim()) }
        });
        let hint = hints.get(header).copied();
        let column: Column = match hint {
            Some(hint) if hint.is_integer => {
                let values: Vec<Option<i64>> =
                    cells.map(|cell| cell.and_then(|v| v.parse().ok())).collect();
                Series::new(header.as_str().into(), values).into()
            }
            Some(hint) if hint.is_numeric => {
                let values: Vec<Option<f64>> =
                    cells.map(|cell| cell.and_then(|v| v.parse().ok())).collect();
                Series::new(header.as_str().into(), values).into()
            }
            _ => {
                let values: Vec<Option<String>> =
                    cells.map(|cell| cell.map(str::to_string)).collect();
                Series::new(header.as_str().into(), values).into()
            }
        };
        columns.push(column);
    }
    let frame = DataFrame::new(columns).context("build frame from csv table")?;
    Ok(frame)
}

/// Reads a CSV file straight into a typed frame.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    let table = read_csv_table(path)?;
    let frame = table_to_dataframe(&table)
        .with_context(|| format!("convert csv: {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "loaded csv"
    );
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokens() {
        assert!(is_missing(""));
        assert!(is_missing(" NaN "));
        assert!(is_missing("NA"));
        assert!(!is_missing("0"));
        assert!(!is_missing("nano"));
    }

    #[test]
    fn header_normalization_collapses_whitespace() {
        assert_eq!(normalize_header("\u{feff} stay   id "), "stay id");
    }
}
