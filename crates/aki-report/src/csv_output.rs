//! Result table CSV output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{AnyValue, DataFrame, TimeUnit};
use tracing::info;

use aki_core::format_timestamp;
use aki_ingest::any_to_string;

/// File name of the result table inside the input folder.
pub const RESULT_FILE_NAME: &str = "aki.csv";

pub fn default_output_path(folder: &Path) -> PathBuf {
    folder.join(RESULT_FILE_NAME)
}

/// Write the staged table as CSV.
///
/// Datetimes are written as `YYYY-MM-DD HH:MM:SS`, floats without trailing
/// zeros and nulls as empty cells. Missing parent directories are created.
pub fn write_result_csv(path: &Path, df: &DataFrame) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;

    let columns = df.get_columns();
    writer
        .write_record(columns.iter().map(|column| column.name().as_str()))
        .with_context(|| format!("write header to {}", path.display()))?;
    let mut record = Vec::with_capacity(columns.len());
    for row_idx in 0..df.height() {
        record.clear();
        for column in columns {
            let value = column.get(row_idx).unwrap_or(AnyValue::Null);
            record.push(cell_text(value));
        }
        writer
            .write_record(&record)
            .with_context(|| format!("write row {row_idx} to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;

    info!(
        path = %path.display(),
        row_count = df.height(),
        column_count = columns.len(),
        "wrote result table"
    );
    Ok(path.to_path_buf())
}

fn cell_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Datetime(value, unit, _) => format_timestamp(to_millis(value, unit)),
        AnyValue::DatetimeOwned(value, unit, _) => format_timestamp(to_millis(value, unit)),
        other => any_to_string(other),
    }
}

fn to_millis(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => value.div_euclid(1_000_000),
        TimeUnit::Microseconds => value.div_euclid(1_000),
        TimeUnit::Milliseconds => value,
    }
}
