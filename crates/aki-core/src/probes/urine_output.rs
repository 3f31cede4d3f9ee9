use anyhow::Result;
use polars::prelude::DataFrame;

use aki_model::{DatasetKind, UrineOutputMethod, UrineOutputProbeOptions};

use crate::frame::{has_column, numeric_column_f64, require_column, set_i64_column};
use crate::series::{WindowAgg, rolling};

pub const URINEOUTPUT_STAGE: &str = "urineoutput_stage";

/// Urine output criterion: weight-normalised hourly volume over 6, 12 and
/// 24 hour windows.
#[derive(Debug, Clone, Default)]
pub struct UrineOutputProbe {
    options: UrineOutputProbeOptions,
}

impl UrineOutputProbe {
    pub fn new(options: UrineOutputProbeOptions) -> Self {
        Self { options }
    }

    pub(crate) fn apply(&self, urine: &DataFrame, demographics: &DataFrame) -> Result<DataFrame> {
        require_column(urine, DatasetKind::UrineOutput, &self.options.column)?;
        let values = numeric_column_f64(urine, &self.options.column)?;
        let weight = if has_column(demographics, &self.options.weight_column) {
            numeric_column_f64(demographics, &self.options.weight_column)?
                .into_iter()
                .flatten()
                .last()
        } else {
            None
        };
        let stages = urine_output_stages(&values, weight, &self.options);
        let mut table = urine.clone();
        set_i64_column(&mut table, URINEOUTPUT_STAGE, stages.into_iter().map(Some).collect())?;
        Ok(table)
    }
}

/// Stage per hourly row.
///
/// Rules, each applied when its window is complete: 6h rate < 0.5 gives 1,
/// 12h rate < 0.5 gives 2, 24h rate < 0.3 gives 3, 12h rate below the anuria
/// limit gives 3. The highest satisfied rule wins. Without a positive weight
/// no rule applies.
pub fn urine_output_stages(
    values: &[Option<f64>],
    weight: Option<f64>,
    options: &UrineOutputProbeOptions,
) -> Vec<i64> {
    let mut stages = vec![0i64; values.len()];
    let Some(weight) = weight.filter(|w| *w > 0.0) else {
        return stages;
    };
    let agg = match options.method {
        UrineOutputMethod::Mean => WindowAgg::Mean,
        UrineOutputMethod::Strict => WindowAgg::Max,
    };
    let rules: [(usize, f64, i64); 4] = [
        (6, 0.5, 1),
        (12, 0.5, 2),
        (24, 0.3, 3),
        (12, options.anuria_limit, 3),
    ];
    for (window, limit, stage) in rules {
        for (row, rate) in rolling(values, window, agg).into_iter().enumerate() {
            if rate.is_some_and(|rate| rate / weight < limit) {
                stages[row] = stages[row].max(stage);
            }
        }
    }
    stages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_weight_means_no_stage() {
        let values = vec![Some(0.0); 24];
        let options = UrineOutputProbeOptions::default();
        assert_eq!(urine_output_stages(&values, None, &options), vec![0; 24]);
        assert_eq!(urine_output_stages(&values, Some(0.0), &options), vec![0; 24]);
    }

    #[test]
    fn gaps_break_windows() {
        let mut values = vec![Some(10.0); 8];
        values[3] = None;
        let stages = urine_output_stages(&values, Some(100.0), &UrineOutputProbeOptions::default());
        assert_eq!(stages, vec![0; 8]);
    }
}
