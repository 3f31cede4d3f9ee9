//! Preprocessors bringing raw datasets onto an hourly grid.
//!
//! Each preprocessor consumes the full dataset list and returns it with the
//! tables of its kind replaced; unrelated datasets pass through in place.

mod creatinine;
mod demographics;
mod hourly;
mod rrt;
mod time_index;
mod urine_output;

use anyhow::{Context, Result};
use tracing::debug;

use aki_model::{DatasetKind, PreprocessorConfig};

use crate::frame::{Dataset, FrameKeys, find_dataset};

pub use creatinine::CreatininePreprocessor;
pub use demographics::DemographicsPreprocessor;
pub use rrt::RrtPreprocessor;
pub use time_index::TimeIndexCreator;
pub use urine_output::UrineOutputPreprocessor;

#[derive(Debug, Clone)]
pub enum Preprocessor {
    TimeIndex(TimeIndexCreator),
    UrineOutput(UrineOutputPreprocessor),
    Creatinine(CreatininePreprocessor),
    Demographics(DemographicsPreprocessor),
    Rrt(RrtPreprocessor),
}

impl Preprocessor {
    pub fn from_config(config: &PreprocessorConfig, keys: &FrameKeys) -> Self {
        let keys = keys.clone();
        match config {
            PreprocessorConfig::TimeIndex => Preprocessor::TimeIndex(TimeIndexCreator::new(keys)),
            PreprocessorConfig::UrineOutput(options) => {
                Preprocessor::UrineOutput(UrineOutputPreprocessor::new(options.clone(), keys))
            }
            PreprocessorConfig::Creatinine(options) => {
                Preprocessor::Creatinine(CreatininePreprocessor::new(options.clone(), keys))
            }
            PreprocessorConfig::Demographics => {
                Preprocessor::Demographics(DemographicsPreprocessor::new(keys))
            }
            PreprocessorConfig::Rrt(options) => {
                Preprocessor::Rrt(RrtPreprocessor::new(options.clone(), keys))
            }
        }
    }

    /// Time indexing followed by one resampler per dataset kind.
    pub fn defaults(keys: &FrameKeys) -> Vec<Preprocessor> {
        PreprocessorConfig::defaults()
            .iter()
            .map(|config| Preprocessor::from_config(config, keys))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preprocessor::TimeIndex(_) => "time_index",
            Preprocessor::UrineOutput(_) => "urineoutput",
            Preprocessor::Creatinine(_) => "creatinine",
            Preprocessor::Demographics(_) => "demographics",
            Preprocessor::Rrt(_) => "rrt",
        }
    }

    /// Dataset kinds this preprocessor rewrites.
    pub fn kinds(&self) -> &'static [DatasetKind] {
        match self {
            Preprocessor::TimeIndex(_) => &[
                DatasetKind::UrineOutput,
                DatasetKind::Creatinine,
                DatasetKind::RenalReplacementTherapy,
            ],
            Preprocessor::UrineOutput(_) => &[DatasetKind::UrineOutput],
            Preprocessor::Creatinine(_) => &[DatasetKind::Creatinine],
            Preprocessor::Demographics(_) => &[DatasetKind::Demographics],
            Preprocessor::Rrt(_) => &[DatasetKind::RenalReplacementTherapy],
        }
    }

    pub fn process(&self, datasets: Vec<Dataset>) -> Result<Vec<Dataset>> {
        match self {
            Preprocessor::TimeIndex(inner) => inner.process(datasets),
            Preprocessor::UrineOutput(inner) => {
                replace_kind(datasets, inner.kind(), self.name(), |d| inner.resample(d))
            }
            Preprocessor::Creatinine(inner) => {
                replace_kind(datasets, inner.kind(), self.name(), |d| inner.resample(d))
            }
            Preprocessor::Demographics(inner) => {
                replace_kind(datasets, inner.kind(), self.name(), |d| inner.collapse(d))
            }
            Preprocessor::Rrt(inner) => {
                replace_kind(datasets, inner.kind(), self.name(), |d| inner.resample(d))
            }
        }
    }
}

fn replace_kind(
    mut datasets: Vec<Dataset>,
    kind: DatasetKind,
    name: &str,
    f: impl FnOnce(&Dataset) -> Result<Dataset>,
) -> Result<Vec<Dataset>> {
    let Some(position) = find_dataset(&datasets, kind)? else {
        debug!(preprocessor = name, kind = %kind, "skip preprocessor");
        return Ok(datasets);
    };
    let processed = f(&datasets[position])
        .with_context(|| format!("preprocess {kind} dataset with {name}"))?;
    debug!(
        preprocessor = name,
        kind = %kind,
        input_rows = datasets[position].record_count(),
        output_rows = processed.record_count(),
        "preprocessed dataset"
    );
    datasets[position] = processed;
    Ok(datasets)
}
