//! Dataset file discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use aki_model::DatasetKind;

use crate::error::{IngestError, Result};

/// File names looked up for each dataset kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFileNames {
    pub urineoutput: String,
    pub creatinine: String,
    pub rrt: String,
    pub demographics: String,
}

impl Default for DatasetFileNames {
    fn default() -> Self {
        Self {
            urineoutput: "urineoutput.csv".to_string(),
            creatinine: "creatinine.csv".to_string(),
            rrt: "rrt.csv".to_string(),
            demographics: "demographics.csv".to_string(),
        }
    }
}

impl DatasetFileNames {
    pub fn file_name(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::UrineOutput => &self.urineoutput,
            DatasetKind::Creatinine => &self.creatinine,
            DatasetKind::Demographics => &self.demographics,
            DatasetKind::RenalReplacementTherapy => &self.rrt,
        }
    }
}

/// Result of scanning an input folder.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Dataset files that exist, in [`DatasetKind::ALL`] order.
    pub datasets: Vec<(DatasetKind, PathBuf)>,
    /// Expected files that are absent.
    pub missing: Vec<(DatasetKind, PathBuf)>,
    /// Other CSV files in the folder.
    pub unused: Vec<PathBuf>,
}

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Locates the dataset files of a folder.
///
/// Fails when the folder does not exist or holds none of the expected files;
/// a partial set is fine, the analyser skips criteria without input.
pub fn discover_dataset_files(dir: &Path, names: &DatasetFileNames) -> Result<Discovery> {
    let csv_files = list_csv_files(dir)?;
    let mut discovery = Discovery::default();

    for kind in DatasetKind::ALL {
        let path = dir.join(names.file_name(kind));
        if path.is_file() {
            debug!(kind = %kind, path = %path.display(), "found dataset file");
            discovery.datasets.push((kind, path));
        } else {
            discovery.missing.push((kind, path));
        }
    }

    discovery.unused = csv_files
        .into_iter()
        .filter(|path| !discovery.datasets.iter().any(|(_, known)| known == path))
        .collect();

    if discovery.datasets.is_empty() {
        let expected = DatasetKind::ALL
            .iter()
            .map(|kind| names.file_name(*kind))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(IngestError::NoDatasets {
            path: dir.to_path_buf(),
            expected,
        });
    }

    Ok(discovery)
}
