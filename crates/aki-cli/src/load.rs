//! Loading of the input folder and the optional configuration file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use aki_core::Dataset;
use aki_ingest::{DatasetFileNames, discover_dataset_files, read_csv_frame};
use aki_model::{AnalyserConfig, DatasetKind};

/// Header prefix given to blank CSV headers, typically a written-out row index.
const UNNAMED_PREFIX: &str = "unnamed_";

#[derive(Debug)]
pub struct LoadedFile {
    pub kind: DatasetKind,
    pub path: PathBuf,
    pub records: usize,
}

#[derive(Debug)]
pub struct LoadedInput {
    pub datasets: Vec<Dataset>,
    pub files: Vec<LoadedFile>,
}

/// Reads every dataset file present in `folder`.
///
/// Absent files are logged and skipped; the call fails only when none of the
/// expected files exists or a present file cannot be read.
pub fn load_datasets(folder: &Path, names: &DatasetFileNames) -> Result<LoadedInput> {
    let start = Instant::now();
    let discovery = discover_dataset_files(folder, names)
        .with_context(|| format!("discover datasets in {}", folder.display()))?;
    for (kind, path) in &discovery.missing {
        warn!(kind = %kind, path = %path.display(), "dataset file not found, skipping");
    }
    for path in &discovery.unused {
        debug!(path = %path.display(), "ignoring csv file");
    }

    let mut datasets = Vec::with_capacity(discovery.datasets.len());
    let mut files = Vec::with_capacity(discovery.datasets.len());
    for (kind, path) in discovery.datasets {
        let frame = read_csv_frame(&path)
            .with_context(|| format!("load {kind} dataset from {}", path.display()))?;
        let frame = drop_unnamed_columns(frame);
        files.push(LoadedFile {
            kind,
            path,
            records: frame.height(),
        });
        datasets.push(Dataset::new(kind, frame));
    }
    info!(
        folder = %folder.display(),
        dataset_count = datasets.len(),
        record_count = files.iter().map(|file| file.records).sum::<usize>(),
        duration_ms = start.elapsed().as_millis(),
        "loaded datasets"
    );
    Ok(LoadedInput { datasets, files })
}

fn drop_unnamed_columns(frame: DataFrame) -> DataFrame {
    let unnamed: Vec<String> = frame
        .get_column_names()
        .into_iter()
        .filter(|name| name.starts_with(UNNAMED_PREFIX))
        .map(|name| name.to_string())
        .collect();
    if unnamed.is_empty() {
        return frame;
    }
    debug!(columns = ?unnamed, "dropping unnamed columns");
    frame.drop_many(unnamed)
}

/// Reads a JSON analyser configuration, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<AnalyserConfig> {
    let Some(path) = path else {
        return Ok(AnalyserConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: AnalyserConfig = serde_json::from_str(&text)
        .with_context(|| format!("parse config {}", path.display()))?;
    debug!(
        path = %path.display(),
        probe_count = config.probes.len(),
        preprocessor_count = config.preprocessors.len(),
        "loaded config"
    );
    Ok(config)
}
