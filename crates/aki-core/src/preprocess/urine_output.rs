use anyhow::Result;

use aki_model::{DatasetKind, UrineOutputPreprocessOptions};

use super::hourly::{HourlyAgg, HourlyTable};
use crate::frame::{Dataset, FrameKeys};
use crate::series::spread_backward;

/// Resamples urine output to hourly volumes.
///
/// Hours without a positive volume are unmeasured. With interpolation a
/// volume recorded after a gap is spread evenly back over that gap.
#[derive(Debug, Clone, Default)]
pub struct UrineOutputPreprocessor {
    options: UrineOutputPreprocessOptions,
    keys: FrameKeys,
}

impl UrineOutputPreprocessor {
    pub fn new(options: UrineOutputPreprocessOptions, keys: FrameKeys) -> Self {
        Self { options, keys }
    }

    pub fn kind(&self) -> DatasetKind {
        DatasetKind::UrineOutput
    }

    pub(crate) fn resample(&self, dataset: &Dataset) -> Result<Dataset> {
        let column = &self.options.column;
        let mut hourly = HourlyTable::build(
            &dataset.table,
            &self.keys,
            dataset.kind,
            column,
            HourlyAgg::Sum,
        )?;
        let threshold = self.options.threshold;
        let interpolate = self.options.interpolate;
        hourly.for_each_segment(column, |values| {
            for value in values.iter_mut() {
                if *value == Some(0.0) {
                    *value = None;
                }
            }
            if interpolate {
                spread_backward(values, threshold);
            }
        });
        Ok(dataset.with_table(hourly.into_dataframe(&self.keys)?))
    }
}
