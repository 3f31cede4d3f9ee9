//! Datasets and column helpers.
//!
//! Tables travel through the pipeline as polars frames tagged with their
//! [`DatasetKind`]. Numeric work is done on plain vectors read out of the
//! frame cell by cell, because CSV input leaves column types loose.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::{
    AnyValue, BooleanChunked, DataFrame, DataType, NamedFrom, NewChunkedArray, Series, TimeUnit,
};

use aki_ingest::{any_to_f64, any_to_i64, any_to_stay_id, any_to_string};
use aki_model::{AkiError, DEFAULT_STAY_COLUMN, DEFAULT_TIME_COLUMN, DatasetKind, StayId};

use crate::time::parse_timestamp;

/// A table and the clinical meaning of its rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub table: DataFrame,
}

impl Dataset {
    pub fn new(kind: DatasetKind, table: DataFrame) -> Self {
        Self { kind, table }
    }

    pub fn record_count(&self) -> usize {
        self.table.height()
    }

    /// Same kind, different table.
    pub fn with_table(&self, table: DataFrame) -> Self {
        Self {
            kind: self.kind,
            table,
        }
    }
}

/// Names of the stay and time key columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameKeys {
    pub stay_column: String,
    pub time_column: String,
}

impl Default for FrameKeys {
    fn default() -> Self {
        Self {
            stay_column: DEFAULT_STAY_COLUMN.to_string(),
            time_column: DEFAULT_TIME_COLUMN.to_string(),
        }
    }
}

impl FrameKeys {
    pub fn new(stay_column: impl Into<String>, time_column: impl Into<String>) -> Self {
        Self {
            stay_column: stay_column.into(),
            time_column: time_column.into(),
        }
    }

    pub fn is_key(&self, name: &str) -> bool {
        name == self.stay_column || name == self.time_column
    }
}

/// Position of the only dataset of `kind`, if any.
pub fn find_dataset(datasets: &[Dataset], kind: DatasetKind) -> aki_model::Result<Option<usize>> {
    let mut positions = datasets
        .iter()
        .enumerate()
        .filter(|(_, dataset)| dataset.kind == kind)
        .map(|(idx, _)| idx);
    let first = positions.next();
    let extra = positions.count();
    if extra > 0 {
        return Err(AkiError::DuplicateDataset {
            kind,
            count: extra + 1,
        });
    }
    Ok(first)
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Fails with [`AkiError::MissingColumn`] when `name` is absent.
pub fn require_column(df: &DataFrame, kind: DatasetKind, name: &str) -> aki_model::Result<()> {
    if has_column(df, name) {
        Ok(())
    } else {
        Err(AkiError::MissingColumn {
            kind,
            column: name.to_string(),
        })
    }
}

pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
        let trimmed = value.trim();
        values.push((!trimmed.is_empty()).then(|| trimmed.to_string()));
    }
    Ok(values)
}

pub fn numeric_column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = series.get(idx).unwrap_or(AnyValue::Null);
        values.push(any_to_f64(value));
    }
    Ok(values)
}

pub fn numeric_column_i64(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = series.get(idx).unwrap_or(AnyValue::Null);
        values.push(any_to_i64(value));
    }
    Ok(values)
}

pub fn stay_column(df: &DataFrame, name: &str) -> Result<Vec<Option<StayId>>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = series.get(idx).unwrap_or(AnyValue::Null);
        values.push(any_to_stay_id(value));
    }
    Ok(values)
}

/// Reads a time column as epoch milliseconds.
///
/// Datetime and Date columns are converted from their unit, integer columns
/// are taken as epoch milliseconds and text is parsed. Unparseable text is an
/// [`AkiError::InvalidTimestamp`].
pub fn timestamp_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df.column(name)?;
    // (multiplier, divisor) from the physical value to milliseconds
    let scale: Option<(i64, i64)> = match column.dtype() {
        DataType::Datetime(TimeUnit::Milliseconds, _) => Some((1, 1)),
        DataType::Datetime(TimeUnit::Microseconds, _) => Some((1, 1_000)),
        DataType::Datetime(TimeUnit::Nanoseconds, _) => Some((1, 1_000_000)),
        DataType::Date => Some((86_400_000, 1)),
        _ => None,
    };
    if let Some((multiplier, divisor)) = scale {
        let physical = column.cast(&DataType::Int64)?;
        let mut values = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let value = physical.get(idx).unwrap_or(AnyValue::Null);
            values.push(any_to_i64(value).map(|v| (v * multiplier).div_euclid(divisor)));
        }
        return Ok(values);
    }
    if is_numeric_dtype(column.dtype()) {
        return numeric_column_i64(df, name);
    }
    let raw = string_column(df, name)?;
    let mut values = Vec::with_capacity(raw.len());
    for cell in raw {
        let Some(cell) = cell else {
            values.push(None);
            continue;
        };
        let parsed = parse_timestamp(&cell).ok_or_else(|| AkiError::InvalidTimestamp {
            column: name.to_string(),
            value: cell.clone(),
        })?;
        values.push(Some(parsed));
    }
    Ok(values)
}

pub fn set_i64_column(df: &mut DataFrame, name: &str, values: Vec<Option<i64>>) -> Result<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

/// Millisecond datetime column from epoch milliseconds.
pub fn datetime_series(name: &str, values: Vec<Option<i64>>) -> Result<Series> {
    let series = Series::new(name.into(), values)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(series)
}

/// Stay column: Int64 when every id is an integer, String otherwise.
pub fn stay_series(name: &str, stays: &[StayId]) -> Series {
    let ints: Option<Vec<i64>> = stays.iter().map(StayId::as_int).collect();
    match ints {
        Some(ints) => Series::new(name.into(), ints),
        None => {
            let text: Vec<String> = stays.iter().map(ToString::to_string).collect();
            Series::new(name.into(), text)
        }
    }
}

pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Row indices per stay, stays in sorted order, rows in table order.
/// Rows without a stay id are dropped.
pub fn group_rows_by_stay(stays: &[Option<StayId>]) -> BTreeMap<StayId, Vec<usize>> {
    let mut groups: BTreeMap<StayId, Vec<usize>> = BTreeMap::new();
    for (idx, stay) in stays.iter().enumerate() {
        if let Some(stay) = stay {
            groups.entry(stay.clone()).or_default().push(idx);
        }
    }
    groups
}
