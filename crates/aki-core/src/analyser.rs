//! Stay-by-stay orchestration of preprocessors and probes.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, DataType, NamedFrom, Series};
use tracing::{debug, info, info_span};

use aki_model::{AkiError, AnalyserConfig, DatasetKind, StayId};

use crate::frame::{
    Dataset, FrameKeys, column_names, datetime_series, filter_rows, find_dataset,
    group_rows_by_stay, has_column, is_numeric_dtype, numeric_column_f64, numeric_column_i64,
    require_column, stay_column, stay_series, string_column, timestamp_column,
};
use crate::preprocess::Preprocessor;
use crate::probes::Probe;
use crate::series::row_max;

/// Overall stage column, the maximum over every `*_stage` column.
pub const STAGE_COLUMN: &str = "stage";
const STAGE_SUFFIX: &str = "_stage";

/// Runs the staging pipeline over a set of datasets.
///
/// Construction validates and preprocesses the datasets once; stays are then
/// probed independently and their results concatenated in stay order.
#[derive(Debug, Clone)]
pub struct Analyser {
    datasets: Vec<Dataset>,
    stay_rows: Vec<BTreeMap<StayId, Vec<usize>>>,
    probes: Vec<Probe>,
    keys: FrameKeys,
}

impl Analyser {
    pub fn new(
        datasets: Vec<Dataset>,
        probes: Vec<Probe>,
        preprocessors: Vec<Preprocessor>,
        keys: FrameKeys,
    ) -> Result<Self> {
        for kind in DatasetKind::ALL {
            find_dataset(&datasets, kind)?;
        }
        validate_non_negative(&datasets)?;

        let datasets = info_span!("preprocess").in_scope(|| -> Result<Vec<Dataset>> {
            let start = Instant::now();
            info!(
                dataset_count = datasets.len(),
                preprocessor_count = preprocessors.len(),
                "start preprocessing"
            );
            let mut datasets = datasets;
            for preprocessor in &preprocessors {
                datasets = preprocessor.process(datasets)?;
            }
            info!(
                dataset_count = datasets.len(),
                record_count = datasets.iter().map(Dataset::record_count).sum::<usize>(),
                duration_ms = start.elapsed().as_millis(),
                "finish preprocessing"
            );
            Ok(datasets)
        })?;

        let mut stay_rows = Vec::with_capacity(datasets.len());
        for dataset in &datasets {
            require_column(&dataset.table, dataset.kind, &keys.stay_column)?;
            let stays = stay_column(&dataset.table, &keys.stay_column)?;
            stay_rows.push(group_rows_by_stay(&stays));
        }

        Ok(Self {
            datasets,
            stay_rows,
            probes,
            keys,
        })
    }

    /// Default preprocessors and probes on the default key columns.
    pub fn with_defaults(datasets: Vec<Dataset>) -> Result<Self> {
        Self::from_config(datasets, &AnalyserConfig::default())
    }

    pub fn from_config(datasets: Vec<Dataset>, config: &AnalyserConfig) -> Result<Self> {
        let keys = FrameKeys::new(&config.stay_column, &config.time_column);
        let probes = config
            .probes
            .iter()
            .map(|probe| Probe::from_config(probe, &keys))
            .collect();
        let preprocessors = config
            .preprocessors
            .iter()
            .map(|preprocessor| Preprocessor::from_config(preprocessor, &keys))
            .collect();
        Self::new(datasets, probes, preprocessors, keys)
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn keys(&self) -> &FrameKeys {
        &self.keys
    }

    /// Every stay appearing in any dataset, sorted.
    pub fn stay_ids(&self) -> Vec<StayId> {
        let mut stays = BTreeSet::new();
        for groups in &self.stay_rows {
            stays.extend(groups.keys().cloned());
        }
        stays.into_iter().collect()
    }

    /// Probes one stay and merges its datasets on the hourly time axis.
    ///
    /// A stay without time-series rows yields an empty frame.
    pub fn process_stay(&self, stay: &StayId) -> Result<DataFrame> {
        let mut slices = Vec::new();
        for (dataset, groups) in self.datasets.iter().zip(&self.stay_rows) {
            let Some(rows) = groups.get(stay) else {
                continue;
            };
            let mut keep = vec![false; dataset.record_count()];
            for &row in rows {
                keep[row] = true;
            }
            let table = filter_rows(&dataset.table, &keep)?.drop(&self.keys.stay_column)?;
            slices.push(dataset.with_table(table));
        }
        for probe in &self.probes {
            slices = probe.probe(slices)?;
        }
        self.merge(stay, &slices)
    }

    /// Processes every stay and stacks the results.
    ///
    /// Columns are aligned by name: the stay and time columns first, then
    /// merged columns in order of first appearance, then [`STAGE_COLUMN`].
    pub fn process_stays(&self) -> Result<DataFrame> {
        info_span!("probe").in_scope(|| {
            let start = Instant::now();
            let stays = self.stay_ids();
            info!(
                stay_count = stays.len(),
                probe_count = self.probes.len(),
                "start probing"
            );
            let mut frames = Vec::with_capacity(stays.len());
            for stay in &stays {
                let frame = self
                    .process_stay(stay)
                    .with_context(|| format!("process stay {stay}"))?;
                debug!(stay = %stay, row_count = frame.height(), "processed stay");
                if frame.height() > 0 {
                    frames.push(frame);
                }
            }
            let text_stays = stays.iter().any(|stay| stay.as_int().is_none());
            let result = concat_aligned(frames, &self.keys, text_stays)?;
            info!(
                stay_count = stays.len(),
                row_count = result.height(),
                duration_ms = start.elapsed().as_millis(),
                "finish probing"
            );
            Ok(result)
        })
    }

    fn merge(&self, stay: &StayId, slices: &[Dataset]) -> Result<DataFrame> {
        let time_name = &self.keys.time_column;
        let mut timed = Vec::new();
        let mut fixed = Vec::new();
        for slice in slices {
            if !slice.kind.is_time_series() {
                fixed.push(slice);
            } else if has_column(&slice.table, time_name) {
                timed.push((slice, timestamp_column(&slice.table, time_name)?));
            } else {
                debug!(stay = %stay, kind = %slice.kind, "no time column, not merged");
            }
        }

        let hours: BTreeSet<i64> = timed
            .iter()
            .flat_map(|(_, times)| times.iter().flatten().copied())
            .collect();
        if hours.is_empty() {
            debug!(stay = %stay, "stay has no time-series rows");
            return Ok(DataFrame::empty());
        }
        let hours: Vec<i64> = hours.into_iter().collect();
        let position: HashMap<i64, usize> =
            hours.iter().enumerate().map(|(idx, hour)| (*hour, idx)).collect();
        let len = hours.len();

        let mut merged: Vec<(String, MergedColumn)> = Vec::new();
        let is_new = |merged: &[(String, MergedColumn)], name: &str| {
            name != time_name.as_str()
                && name != STAGE_COLUMN
                && !merged.iter().any(|(existing, _)| existing == name)
        };
        for (slice, times) in &timed {
            for column in slice.table.get_columns() {
                let name = column.name().as_str();
                if !is_new(merged.as_slice(), name) {
                    continue;
                }
                let values = MergedColumn::read(&slice.table, name, column.dtype())?;
                merged.push((name.to_string(), values.align(times, &position, len)));
            }
        }
        for slice in fixed {
            for column in slice.table.get_columns() {
                let name = column.name().as_str();
                if !is_new(merged.as_slice(), name) {
                    continue;
                }
                let values = MergedColumn::read(&slice.table, name, column.dtype())?;
                merged.push((name.to_string(), values.broadcast(len)));
            }
        }

        let stage_columns: Vec<Vec<Option<i64>>> = merged
            .iter()
            .filter(|(name, _)| name.ends_with(STAGE_SUFFIX))
            .map(|(_, values)| values.stages())
            .collect();
        let stage = row_max(&stage_columns, len);

        let mut columns: Vec<Column> = Vec::with_capacity(merged.len() + 3);
        columns.push(stay_series(&self.keys.stay_column, &vec![stay.clone(); len]).into());
        columns.push(datetime_series(time_name, hours.into_iter().map(Some).collect())?.into());
        for (name, values) in merged {
            columns.push(values.into_series(&name).into());
        }
        columns.push(Series::new(STAGE_COLUMN.into(), stage).into());
        Ok(DataFrame::new(columns)?)
    }
}

fn validate_non_negative(datasets: &[Dataset]) -> Result<()> {
    for dataset in datasets {
        for column in dataset.table.get_columns() {
            if !is_numeric_dtype(column.dtype()) {
                continue;
            }
            let name = column.name().as_str();
            let values = numeric_column_f64(&dataset.table, name)?;
            if values.iter().flatten().any(|value| *value < 0.0) {
                return Err(AkiError::NegativeValue {
                    kind: dataset.kind,
                    column: name.to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// One merged column, typed after its source column.
#[derive(Debug, Clone)]
enum MergedColumn {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

fn align_values<T: Clone>(
    values: Vec<Option<T>>,
    times: &[Option<i64>],
    position: &HashMap<i64, usize>,
    len: usize,
) -> Vec<Option<T>> {
    let mut out = vec![None; len];
    for (value, time) in values.into_iter().zip(times) {
        if let Some(idx) = time.and_then(|t| position.get(&t).copied()) {
            out[idx] = value;
        }
    }
    out
}

fn repeat_first<T: Clone>(values: Vec<Option<T>>, len: usize) -> Vec<Option<T>> {
    let first = values.into_iter().next().flatten();
    vec![first; len]
}

impl MergedColumn {
    fn read(df: &DataFrame, name: &str, dtype: &DataType) -> Result<Self> {
        Ok(match dtype {
            DataType::Float32 | DataType::Float64 => MergedColumn::Float(numeric_column_f64(df, name)?),
            dtype if is_numeric_dtype(dtype) => MergedColumn::Int(numeric_column_i64(df, name)?),
            _ => MergedColumn::Text(string_column(df, name)?),
        })
    }

    /// Places each row at its hour; a later row for the same hour wins.
    fn align(self, times: &[Option<i64>], position: &HashMap<i64, usize>, len: usize) -> Self {
        match self {
            MergedColumn::Int(v) => MergedColumn::Int(align_values(v, times, position, len)),
            MergedColumn::Float(v) => MergedColumn::Float(align_values(v, times, position, len)),
            MergedColumn::Text(v) => MergedColumn::Text(align_values(v, times, position, len)),
        }
    }

    fn broadcast(self, len: usize) -> Self {
        match self {
            MergedColumn::Int(v) => MergedColumn::Int(repeat_first(v, len)),
            MergedColumn::Float(v) => MergedColumn::Float(repeat_first(v, len)),
            MergedColumn::Text(v) => MergedColumn::Text(repeat_first(v, len)),
        }
    }

    fn stages(&self) -> Vec<Option<i64>> {
        match self {
            MergedColumn::Int(v) => v.clone(),
            // only whole finite values are stages
            MergedColumn::Float(v) => v
                .iter()
                .map(|value| {
                    value
                        .filter(|s| s.is_finite() && s.fract() == 0.0)
                        .map(|s| s as i64)
                })
                .collect(),
            MergedColumn::Text(v) => v
                .iter()
                .map(|value| value.as_deref().and_then(|s| s.parse().ok()))
                .collect(),
        }
    }

    fn into_series(self, name: &str) -> Series {
        match self {
            MergedColumn::Int(v) => Series::new(name.into(), v),
            MergedColumn::Float(v) => Series::new(name.into(), v),
            MergedColumn::Text(v) => Series::new(name.into(), v),
        }
    }
}

/// Stacks per-stay frames whose column sets may differ.
fn concat_aligned(frames: Vec<DataFrame>, keys: &FrameKeys, text_stays: bool) -> Result<DataFrame> {
    let mut order: Vec<String> = vec![keys.stay_column.clone(), keys.time_column.clone()];
    let mut dtypes: HashMap<String, DataType> = HashMap::new();
    for frame in &frames {
        for column in frame.get_columns() {
            let name = column.name().to_string();
            dtypes.entry(name.clone()).or_insert_with(|| column.dtype().clone());
            if !order.contains(&name) && name != STAGE_COLUMN {
                order.push(name);
            }
        }
    }
    order.push(STAGE_COLUMN.to_string());

    let mut aligned = Vec::with_capacity(frames.len());
    for mut frame in frames {
        if text_stays {
            let stays = frame.column(&keys.stay_column)?.cast(&DataType::String)?;
            frame.with_column(stays)?;
        }
        for name in &order {
            if has_column(&frame, name) {
                continue;
            }
            let dtype = dtypes.get(name).cloned().unwrap_or(DataType::Float64);
            frame.with_column(Series::full_null(name.as_str().into(), frame.height(), &dtype))?;
        }
        aligned.push(frame.select(order.iter().map(String::as_str))?);
    }

    let mut frames = aligned.into_iter();
    let Some(mut result) = frames.next() else {
        return Ok(DataFrame::empty());
    };
    for frame in frames {
        result.vstack_mut(&frame)?;
    }
    debug!(columns = ?column_names(&result), "concatenated stays");
    Ok(result)
}
