use anyhow::{Context, Result};
use polars::prelude::DataType;
use tracing::debug;

use crate::frame::{Dataset, FrameKeys, datetime_series, timestamp_column};

/// Parses the time column of time-series tables into millisecond datetimes.
#[derive(Debug, Clone, Default)]
pub struct TimeIndexCreator {
    keys: FrameKeys,
}

impl TimeIndexCreator {
    pub fn new(keys: FrameKeys) -> Self {
        Self { keys }
    }

    pub fn process(&self, datasets: Vec<Dataset>) -> Result<Vec<Dataset>> {
        datasets
            .into_iter()
            .map(|dataset| self.index(dataset))
            .collect()
    }

    fn index(&self, dataset: Dataset) -> Result<Dataset> {
        if !dataset.kind.is_time_series() {
            return Ok(dataset);
        }
        let time_column = &self.keys.time_column;
        let Ok(column) = dataset.table.column(time_column) else {
            debug!(kind = %dataset.kind, column = %time_column, "no time column to index");
            return Ok(dataset);
        };
        if matches!(column.dtype(), DataType::Datetime(_, _)) {
            return Ok(dataset);
        }
        let millis = timestamp_column(&dataset.table, time_column)
            .with_context(|| format!("index time column of {} dataset", dataset.kind))?;
        let mut table = dataset.table.clone();
        table.with_column(datetime_series(time_column, millis)?)?;
        Ok(dataset.with_table(table))
    }
}
