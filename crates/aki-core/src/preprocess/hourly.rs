use std::ops::Range;

use anyhow::Result;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use tracing::debug;

use aki_model::{DatasetKind, StayId};

use crate::frame::{
    FrameKeys, datetime_series, group_rows_by_stay, is_numeric_dtype, numeric_column_f64,
    require_column, stay_column, stay_series, timestamp_column,
};
use crate::time::{MILLIS_PER_HOUR, floor_hour};

/// How readings falling into the same hour are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HourlyAgg {
    Sum,
    Mean,
    Last,
}

/// A time-series table resampled to one row per stay and hour.
///
/// Every stay covers a contiguous grid from its first to its last occupied
/// hour; hours without readings hold `None`.
#[derive(Debug, Clone)]
pub(crate) struct HourlyTable {
    stays: Vec<StayId>,
    hours: Vec<i64>,
    segments: Vec<Range<usize>>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

#[derive(Default)]
struct Bucket {
    sum: f64,
    count: usize,
    last: Option<f64>,
}

impl HourlyTable {
    /// Resamples `df`. The `measure` column is always kept; any other numeric
    /// non-key column rides along with the same aggregation.
    pub(crate) fn build(
        df: &DataFrame,
        keys: &FrameKeys,
        kind: DatasetKind,
        measure: &str,
        agg: HourlyAgg,
    ) -> Result<Self> {
        require_column(df, kind, &keys.stay_column)?;
        require_column(df, kind, &keys.time_column)?;
        require_column(df, kind, measure)?;

        let stays = stay_column(df, &keys.stay_column)?;
        let times = timestamp_column(df, &keys.time_column)?;

        let mut names = Vec::new();
        for column in df.get_columns() {
            let name = column.name().as_str();
            if keys.is_key(name) {
                continue;
            }
            if name == measure || is_numeric_dtype(column.dtype()) {
                names.push(name.to_string());
            }
        }
        let mut source = Vec::with_capacity(names.len());
        for name in &names {
            source.push(numeric_column_f64(df, name)?);
        }

        let mut table = HourlyTable {
            stays: Vec::new(),
            hours: Vec::new(),
            segments: Vec::new(),
            columns: names.into_iter().map(|name| (name, Vec::new())).collect(),
        };

        for (stay, rows) in group_rows_by_stay(&stays) {
            let mut timed: Vec<(i64, usize)> = rows
                .iter()
                .filter_map(|&row| times[row].map(|t| (t, row)))
                .collect();
            if timed.is_empty() {
                debug!(kind = %kind, stay = %stay, "stay has no timed rows");
                continue;
            }
            // stable: rows sharing a timestamp keep table order for `Last`
            timed.sort_by_key(|(t, _)| *t);
            let first = floor_hour(timed[0].0);
            let last = floor_hour(timed[timed.len() - 1].0);
            let len = usize::try_from((last - first) / MILLIS_PER_HOUR)? + 1;

            let start = table.hours.len();
            for step in 0..len {
                table.hours.push(first + step as i64 * MILLIS_PER_HOUR);
                table.stays.push(stay.clone());
            }
            table.segments.push(start..start + len);

            for (col_idx, (_, out)) in table.columns.iter_mut().enumerate() {
                let mut buckets: Vec<Bucket> = (0..len).map(|_| Bucket::default()).collect();
                for &(t, row) in &timed {
                    let Some(value) = source[col_idx][row] else {
                        continue;
                    };
                    let bucket = &mut buckets[((floor_hour(t) - first) / MILLIS_PER_HOUR) as usize];
                    bucket.sum += value;
                    bucket.count += 1;
                    bucket.last = Some(value);
                }
                out.extend(buckets.into_iter().map(|bucket| {
                    if bucket.count == 0 {
                        return None;
                    }
                    match agg {
                        HourlyAgg::Sum => Some(bucket.sum),
                        HourlyAgg::Mean => Some(bucket.sum / bucket.count as f64),
                        HourlyAgg::Last => bucket.last,
                    }
                }));
            }
        }
        Ok(table)
    }

    /// Applies `f` to each stay's run of `name`, never across stays.
    pub(crate) fn for_each_segment(&mut self, name: &str, mut f: impl FnMut(&mut [Option<f64>])) {
        let Some((_, values)) = self.columns.iter_mut().find(|(column, _)| column == name) else {
            return;
        };
        for segment in &self.segments {
            f(&mut values[segment.clone()]);
        }
    }

    pub(crate) fn into_dataframe(self, keys: &FrameKeys) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 2);
        columns.push(stay_series(&keys.stay_column, &self.stays).into());
        let hours = self.hours.into_iter().map(Some).collect();
        columns.push(datetime_series(&keys.time_column, hours)?.into());
        for (name, values) in self.columns {
            columns.push(Series::new(name.as_str().into(), values).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}
