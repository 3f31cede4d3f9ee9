use anyhow::Result;

use aki_model::{DatasetKind, RrtPreprocessOptions};

use super::hourly::{HourlyAgg, HourlyTable};
use crate::frame::{Dataset, FrameKeys};
use crate::series::forward_fill;

/// Resamples therapy status to the last value of each hour and holds it
/// until the next change.
#[derive(Debug, Clone, Default)]
pub struct RrtPreprocessor {
    options: RrtPreprocessOptions,
    keys: FrameKeys,
}

impl RrtPreprocessor {
    pub fn new(options: RrtPreprocessOptions, keys: FrameKeys) -> Self {
        Self { options, keys }
    }

    pub fn kind(&self) -> DatasetKind {
        DatasetKind::RenalReplacementTherapy
    }

    pub(crate) fn resample(&self, dataset: &Dataset) -> Result<Dataset> {
        let column = &self.options.column;
        let mut hourly = HourlyTable::build(
            &dataset.table,
            &self.keys,
            dataset.kind,
            column,
            HourlyAgg::Last,
        )?;
        hourly.for_each_segment(column, |values| forward_fill(values, None));
        Ok(dataset.with_table(hourly.into_dataframe(&self.keys)?))
    }
}
