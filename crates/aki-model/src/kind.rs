//! Dataset kinds.
//!
//! The kind tags both the clinical meaning of a table and which
//! preprocessors and probes may consume it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AkiError;

/// Closed set of input dataset kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Hourly urine volume in ml.
    #[serde(rename = "urineoutput")]
    UrineOutput,
    /// Serum creatinine in mg/dL.
    Creatinine,
    /// Static per-stay data; must carry the patient's weight in kg.
    Demographics,
    /// Renal replacement therapy status flag (RRT or CRRT), 1 while running.
    #[serde(rename = "rrt", alias = "crrt")]
    RenalReplacementTherapy,
}

impl DatasetKind {
    /// Every kind, in the order datasets are conventionally supplied.
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::UrineOutput,
        DatasetKind::Creatinine,
        DatasetKind::Demographics,
        DatasetKind::RenalReplacementTherapy,
    ];

    /// Stable lowercase name used in logs, config files and file discovery.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::UrineOutput => "urineoutput",
            DatasetKind::Creatinine => "creatinine",
            DatasetKind::Demographics => "demographics",
            DatasetKind::RenalReplacementTherapy => "rrt",
        }
    }

    /// Returns true for kinds indexed by (stay, time) rather than by stay only.
    pub fn is_time_series(&self) -> bool {
        !matches!(self, DatasetKind::Demographics)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = AkiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "urineoutput" | "urine_output" => Ok(DatasetKind::UrineOutput),
            "creatinine" | "creat" => Ok(DatasetKind::Creatinine),
            "demographics" => Ok(DatasetKind::Demographics),
            "rrt" | "crrt" => Ok(DatasetKind::RenalReplacementTherapy),
            _ => Err(AkiError::UnknownDatasetKind(s.to_string())),
        }
    }
}
