//! Error types for AKI data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating input files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// None of the expected dataset files is present.
    #[error("no dataset files found in {path} (expected one of: {expected})")]
    NoDatasets { path: PathBuf, expected: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
