use anyhow::Result;
use polars::prelude::DataFrame;

use aki_model::{BaselineMethod, CreatinineProbeOptions, DEFAULT_TIME_COLUMN, DatasetKind};

use crate::frame::{numeric_column_f64, require_column, set_i64_column, timestamp_column};
use crate::series::{approx_gte, forward_fill};
use crate::time::{MILLIS_PER_HOUR, floor_hour};

pub const ABS_CREATININE_STAGE: &str = "abs_creatinine_stage";
pub const REL_CREATININE_STAGE: &str = "rel_creatinine_stage";

/// Creatinine criteria measured against a baseline.
///
/// One type serves both the absolute-rise and the relative-rise criterion;
/// the [`Probe`](super::Probe) variant selects which stages are emitted.
#[derive(Debug, Clone)]
pub struct CreatinineProbe {
    options: CreatinineProbeOptions,
    time_column: String,
}

impl Default for CreatinineProbe {
    fn default() -> Self {
        Self::new(CreatinineProbeOptions::default())
    }
}

impl CreatinineProbe {
    pub fn new(options: CreatinineProbeOptions) -> Self {
        Self {
            options,
            time_column: DEFAULT_TIME_COLUMN.to_string(),
        }
    }

    pub fn with_time_column(mut self, name: impl Into<String>) -> Self {
        self.time_column = name.into();
        self
    }

    fn read(&self, table: &DataFrame) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>)> {
        let kind = DatasetKind::Creatinine;
        require_column(table, kind, &self.options.column)?;
        require_column(table, kind, &self.time_column)?;
        let values = numeric_column_f64(table, &self.options.column)?;
        let times = timestamp_column(table, &self.time_column)?;
        let baseline = creatinine_baseline(
            &times,
            &values,
            self.options.baseline_timeframe.as_millis(),
            self.options.method,
        );
        Ok((values, baseline))
    }

    pub(crate) fn apply_absolute(&self, table: &DataFrame) -> Result<DataFrame> {
        let (values, baseline) = self.read(table)?;
        let stages = absolute_stages(&values, &baseline);
        let mut table = table.clone();
        set_i64_column(&mut table, ABS_CREATININE_STAGE, stages.into_iter().map(Some).collect())?;
        Ok(table)
    }

    pub(crate) fn apply_relative(&self, table: &DataFrame) -> Result<DataFrame> {
        let (values, baseline) = self.read(table)?;
        let stages = relative_stages(&values, &baseline);
        let mut table = table.clone();
        set_i64_column(&mut table, REL_CREATININE_STAGE, stages.into_iter().map(Some).collect())?;
        Ok(table)
    }
}

/// Baseline creatinine for each row.
///
/// Only positive readings count. Each reading gets the minimum (or, for
/// [`BaselineMethod::First`], the earliest) reading in the trailing window
/// `(t - timeframe, t]`. Those values are binned by hour and carried forward
/// between the first and the last reading. [`BaselineMethod::Fixed`] then
/// freezes every hour after `first hour + timeframe` at the minimum of the
/// hours up to that point. Rows outside the covered hours get no baseline.
pub fn creatinine_baseline(
    times: &[Option<i64>],
    values: &[Option<f64>],
    timeframe_ms: i64,
    method: BaselineMethod,
) -> Vec<Option<f64>> {
    let mut readings: Vec<(i64, f64)> = times
        .iter()
        .zip(values)
        .filter_map(|(time, value)| match (time, value) {
            (Some(t), Some(v)) if *v > 0.0 => Some((*t, *v)),
            _ => None,
        })
        .collect();
    if readings.is_empty() {
        return vec![None; values.len()];
    }
    readings.sort_by_key(|(t, _)| *t);

    let mut window_values = Vec::with_capacity(readings.len());
    let mut start = 0usize;
    for (end, (t, _)) in readings.iter().enumerate() {
        while start < end && readings[start].0 <= t.saturating_sub(timeframe_ms) {
            start += 1;
        }
        let window = &readings[start..=end];
        let value = match method {
            BaselineMethod::First => window[0].1,
            BaselineMethod::Min | BaselineMethod::Fixed => {
                window.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min)
            }
        };
        window_values.push(value);
    }

    let first_hour = floor_hour(readings[0].0);
    let last_hour = floor_hour(readings[readings.len() - 1].0);
    let span = ((last_hour - first_hour) / MILLIS_PER_HOUR) as usize + 1;
    let mut hourly: Vec<Option<f64>> = vec![None; span];
    for ((t, _), value) in readings.iter().zip(window_values) {
        let bin = &mut hourly[((floor_hour(*t) - first_hour) / MILLIS_PER_HOUR) as usize];
        *bin = match (method, *bin) {
            (_, None) => Some(value),
            (BaselineMethod::First, Some(existing)) => Some(existing),
            (_, Some(existing)) => Some(existing.min(value)),
        };
    }
    forward_fill(&mut hourly, None);

    if method == BaselineMethod::Fixed {
        let cutoff = (timeframe_ms / MILLIS_PER_HOUR) as usize;
        let fixed = hourly
            .iter()
            .take(cutoff + 1)
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min);
        for value in hourly.iter_mut().skip(cutoff + 1) {
            *value = Some(fixed);
        }
    }

    times
        .iter()
        .map(|time| {
            let offset = floor_hour((*time)?) - first_hour;
            if offset < 0 {
                return None;
            }
            hourly.get((offset / MILLIS_PER_HOUR) as usize).copied().flatten()
        })
        .collect()
}

/// Rows reading exactly 0 inherit the previous row's stage, 0 at the start.
/// Rows without any reading stay at 0.
fn settle(values: &[Option<f64>], mut stages: Vec<Option<i64>>) -> Vec<i64> {
    for (stage, value) in stages.iter_mut().zip(values) {
        if *value == Some(0.0) {
            *stage = None;
        }
    }
    forward_fill(&mut stages, None);
    stages.into_iter().map(|stage| stage.unwrap_or(0)).collect()
}

/// Rise of at least 0.3 mg/dL over baseline gives 1; a level of at least
/// 4 mg/dL gives 3.
pub fn absolute_stages(values: &[Option<f64>], baseline: &[Option<f64>]) -> Vec<i64> {
    let stages = values
        .iter()
        .zip(baseline)
        .map(|(value, base)| {
            let Some(value) = *value else {
                return Some(0);
            };
            let mut stage = 0;
            if base.is_some_and(|base| approx_gte(value - base, 0.3)) {
                stage = 1;
            }
            if approx_gte(value, 4.0) {
                stage = 3;
            }
            Some(stage)
        })
        .collect();
    settle(values, stages)
}

/// Ratio to baseline of at least 1.5, 2 and 3 gives stages 1, 2 and 3.
pub fn relative_stages(values: &[Option<f64>], baseline: &[Option<f64>]) -> Vec<i64> {
    let stages = values
        .iter()
        .zip(baseline)
        .map(|(value, base)| {
            let ratio = match (*value, *base) {
                (Some(value), Some(base)) => value / base,
                (Some(_), None) | (None, _) => return Some(0),
            };
            let stage = [(3.0, 3), (2.0, 2), (1.5, 1)]
                .into_iter()
                .find(|(limit, _)| approx_gte(ratio, *limit))
                .map_or(0, |(_, stage)| stage);
            Some(stage)
        })
        .collect();
    settle(values, stages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(n: usize) -> Vec<Option<i64>> {
        (0..n as i64).map(|h| Some(h * MILLIS_PER_HOUR)).collect()
    }

    #[test]
    fn trailing_window_excludes_its_left_edge() {
        let values: Vec<Option<f64>> = [1.0, 2.0, 3.0].into_iter().map(Some).collect();
        let min = creatinine_baseline(&hours(3), &values, 2 * MILLIS_PER_HOUR, BaselineMethod::Min);
        assert_eq!(min, vec![Some(1.0), Some(1.0), Some(2.0)]);
        let first =
            creatinine_baseline(&hours(3), &values, 2 * MILLIS_PER_HOUR, BaselineMethod::First);
        assert_eq!(first, vec![Some(1.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn zero_and_missing_readings_are_ignored() {
        let values = vec![None, Some(0.0), Some(2.0), None, Some(1.5)];
        let baseline =
            creatinine_baseline(&hours(5), &values, 24 * MILLIS_PER_HOUR, BaselineMethod::Min);
        assert_eq!(baseline, vec![None, None, Some(2.0), Some(2.0), Some(1.5)]);
    }

    #[test]
    fn fixed_baseline_freezes_after_timeframe() {
        let values: Vec<Option<f64>> = [3.0, 2.0, 4.0, 5.0, 1.0].into_iter().map(Some).collect();
        let baseline =
            creatinine_baseline(&hours(5), &values, MILLIS_PER_HOUR, BaselineMethod::Fixed);
        assert_eq!(
            baseline,
            vec![Some(3.0), Some(2.0), Some(2.0), Some(2.0), Some(2.0)]
        );
    }

    #[test]
    fn zero_readings_carry_previous_stage() {
        let values = vec![Some(1.0), Some(1.4), Some(0.0), Some(0.0), Some(1.0)];
        let baseline = vec![Some(1.0); 5];
        assert_eq!(absolute_stages(&values, &baseline), vec![0, 1, 1, 1, 0]);
    }

    #[test]
    fn missing_readings_are_stage_zero() {
        let values = vec![Some(5.0), None, Some(0.0), Some(2.0)];
        let baseline = vec![Some(1.0); 4];
        assert_eq!(absolute_stages(&values, &baseline), vec![3, 0, 0, 1]);
        assert_eq!(relative_stages(&values, &baseline), vec![3, 0, 0, 2]);
    }

    #[test]
    fn relative_without_baseline_is_zero() {
        let values = vec![Some(5.0), Some(2.0)];
        assert_eq!(relative_stages(&values, &[None, Some(1.0)]), vec![0, 2]);
    }
}
