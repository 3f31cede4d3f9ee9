use anyhow::Result;

use aki_model::{CreatininePreprocessOptions, DatasetKind};

use super::hourly::{HourlyAgg, HourlyTable};
use crate::frame::{Dataset, FrameKeys};
use crate::series::forward_fill;

/// Resamples creatinine to hourly means and carries readings forward.
#[derive(Debug, Clone, Default)]
pub struct CreatininePreprocessor {
    options: CreatininePreprocessOptions,
    keys: FrameKeys,
}

impl CreatininePreprocessor {
    pub fn new(options: CreatininePreprocessOptions, keys: FrameKeys) -> Self {
        Self { options, keys }
    }

    pub fn kind(&self) -> DatasetKind {
        DatasetKind::Creatinine
    }

    pub(crate) fn resample(&self, dataset: &Dataset) -> Result<Dataset> {
        let column = &self.options.column;
        let mut hourly = HourlyTable::build(
            &dataset.table,
            &self.keys,
            dataset.kind,
            column,
            HourlyAgg::Mean,
        )?;
        let limit = self.options.ffill.then_some(self.options.threshold);
        hourly.for_each_segment(column, |values| {
            // a zero reading is a placeholder, not a measurement
            for value in values.iter_mut() {
                if *value == Some(0.0) {
                    *value = None;
                }
            }
            if let Some(limit) = limit {
                forward_fill(values, Some(limit));
            }
        });
        Ok(dataset.with_table(hourly.into_dataframe(&self.keys)?))
    }
}
