use anyhow::Result;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use aki_model::{DatasetKind, StayId};

use crate::frame::{
    Dataset, FrameKeys, group_rows_by_stay, is_numeric_dtype, numeric_column_f64, require_column,
    stay_column, stay_series, string_column,
};

/// Collapses demographics to one row per stay.
///
/// Each column keeps the last non-missing value recorded for the stay, so a
/// weight corrected later in the table wins over the admission value.
#[derive(Debug, Clone, Default)]
pub struct DemographicsPreprocessor {
    keys: FrameKeys,
}

fn last_present<T: Clone>(values: &[Option<T>], rows: &[usize]) -> Option<T> {
    rows.iter().rev().find_map(|&row| values[row].clone())
}

impl DemographicsPreprocessor {
    pub fn new(keys: FrameKeys) -> Self {
        Self { keys }
    }

    pub fn kind(&self) -> DatasetKind {
        DatasetKind::Demographics
    }

    pub(crate) fn collapse(&self, dataset: &Dataset) -> Result<Dataset> {
        let df = &dataset.table;
        let stay_name = &self.keys.stay_column;
        require_column(df, dataset.kind, stay_name)?;
        let groups = group_rows_by_stay(&stay_column(df, stay_name)?);
        let stays: Vec<StayId> = groups.keys().cloned().collect();

        let mut columns: Vec<Column> = vec![stay_series(stay_name, &stays).into()];
        for column in df.get_columns() {
            let name = column.name().as_str();
            if name == stay_name {
                continue;
            }
            let series = if is_numeric_dtype(column.dtype()) {
                let values = numeric_column_f64(df, name)?;
                let collapsed: Vec<Option<f64>> = groups
                    .values()
                    .map(|rows| last_present(&values, rows))
                    .collect();
                Series::new(name.into(), collapsed)
            } else {
                let values = string_column(df, name)?;
                let collapsed: Vec<Option<String>> = groups
                    .values()
                    .map(|rows| last_present(&values, rows))
                    .collect();
                Series::new(name.into(), collapsed)
            };
            columns.push(series.into());
        }
        Ok(dataset.with_table(DataFrame::new(columns)?))
    }
}
