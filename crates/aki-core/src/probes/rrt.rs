use anyhow::Result;
use polars::prelude::DataFrame;

use aki_model::{DatasetKind, RrtProbeOptions};

use crate::frame::{numeric_column_f64, require_column, set_i64_column};

/// Renal replacement therapy criterion: therapy in progress is stage 3.
#[derive(Debug, Clone, Default)]
pub struct RrtProbe {
    options: RrtProbeOptions,
}

impl RrtProbe {
    pub fn new(options: RrtProbeOptions) -> Self {
        Self { options }
    }

    pub fn stage_column(&self) -> &str {
        &self.options.stage_column
    }

    pub(crate) fn apply(&self, table: &DataFrame) -> Result<DataFrame> {
        require_column(table, DatasetKind::RenalReplacementTherapy, &self.options.column)?;
        let status = numeric_column_f64(table, &self.options.column)?;
        let mut table = table.clone();
        set_i64_column(&mut table, &self.options.stage_column, rrt_stages(&status))?;
        Ok(table)
    }
}

/// Status 1 gives 3, any other value 0; hours without status stay unknown.
pub fn rrt_stages(status: &[Option<f64>]) -> Vec<Option<i64>> {
    status
        .iter()
        .map(|value| value.map(|v| if v == 1.0 { 3 } else { 0 }))
        .collect()
}
