use thiserror::Error;

use crate::kind::DatasetKind;

/// Input-contract violations raised by the staging pipeline.
///
/// Any of these aborts the whole run: a malformed dataset compromises every
/// stay, not only the one where it was noticed.
#[derive(Debug, Error)]
pub enum AkiError {
    #[error("dataset of type {kind} contains negative data in column {column}")]
    NegativeValue { kind: DatasetKind, column: String },
    #[error("dataset of type {kind} is missing required column {column}")]
    MissingColumn { kind: DatasetKind, column: String },
    #[error("expected exactly one {kind} dataset, found {count}")]
    DuplicateDataset { kind: DatasetKind, count: usize },
    #[error("invalid timestamp {value:?} in column {column}")]
    InvalidTimestamp { column: String, value: String },
    #[error("invalid timeframe {0:?} (expected e.g. \"7d\" or \"36h\")")]
    InvalidTimeframe(String),
    #[error("unknown dataset kind {0:?}")]
    UnknownDatasetKind(String),
}

pub type Result<T> = std::result::Result<T, AkiError>;
