//! Configuration options for AKI staging.
//!
//! Every option has a default matching the KDIGO reference settings, so an
//! empty configuration file reproduces the built-in pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AkiError;

pub const DEFAULT_STAY_COLUMN: &str = "stay_id";
pub const DEFAULT_TIME_COLUMN: &str = "charttime";
pub const DEFAULT_URINEOUTPUT_COLUMN: &str = "urineoutput";
pub const DEFAULT_CREATININE_COLUMN: &str = "creat";
pub const DEFAULT_WEIGHT_COLUMN: &str = "weight";
pub const DEFAULT_RRT_COLUMN: &str = "rrt_status";
pub const DEFAULT_CRRT_COLUMN: &str = "crrt_status";

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// A whole-hour duration written as `"36h"`, `"7d"` or `"2w"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    hours: i64,
}

impl Timeframe {
    pub const fn hours(hours: i64) -> Self {
        Self { hours }
    }

    pub const fn days(days: i64) -> Self {
        Self {
            hours: days.saturating_mul(24),
        }
    }

    pub fn as_hours(&self) -> i64 {
        self.hours
    }

    pub fn as_millis(&self) -> i64 {
        self.hours.saturating_mul(MILLIS_PER_HOUR)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours % 24 == 0 && self.hours != 0 {
            write!(f, "{}d", self.hours / 24)
        } else {
            write!(f, "{}h", self.hours)
        }
    }
}

impl FromStr for Timeframe {
    type Err = AkiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let invalid = || AkiError::InvalidTimeframe(s.to_string());
        let split = trimmed
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);
        let amount: i64 = digits.parse().map_err(|_| invalid())?;
        let per_unit = match unit.trim() {
            "" | "h" | "hour" | "hours" => 1,
            "d" | "day" | "days" => 24,
            "w" | "week" | "weeks" => 24 * 7,
            _ => return Err(invalid()),
        };
        // must also fit in epoch milliseconds
        let hours = amount
            .checked_mul(per_unit)
            .filter(|hours| *hours > 0 && hours.checked_mul(MILLIS_PER_HOUR).is_some())
            .ok_or_else(invalid)?;
        Ok(Self { hours })
    }
}

impl TryFrom<String> for Timeframe {
    type Error = AkiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(value: Timeframe) -> Self {
        value.to_string()
    }
}

/// Aggregation applied to the rolling urine output windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrineOutputMethod {
    /// Rolling maximum: every hour of the window must be below the limit.
    Strict,
    /// Rolling mean over the window.
    #[default]
    Mean,
}

/// Algorithm used to derive the reference creatinine value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineMethod {
    /// Lowest reading within the trailing timeframe.
    Min,
    /// Earliest reading within the trailing timeframe.
    First,
    /// Lowest reading of the stay's first timeframe, held for the rest of the stay.
    #[default]
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrineOutputProbeOptions {
    pub column: String,
    pub weight_column: String,
    /// Rate in ml/kg/h below which the 12 hour window counts as anuria.
    pub anuria_limit: f64,
    pub method: UrineOutputMethod,
}

impl Default for UrineOutputProbeOptions {
    fn default() -> Self {
        Self {
            column: DEFAULT_URINEOUTPUT_COLUMN.to_string(),
            weight_column: DEFAULT_WEIGHT_COLUMN.to_string(),
            anuria_limit: 0.1,
            method: UrineOutputMethod::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatinineProbeOptions {
    pub column: String,
    pub baseline_timeframe: Timeframe,
    pub method: BaselineMethod,
}

impl Default for CreatinineProbeOptions {
    fn default() -> Self {
        Self {
            column: DEFAULT_CREATININE_COLUMN.to_string(),
            baseline_timeframe: Timeframe::days(7),
            method: BaselineMethod::default(),
        }
    }
}

impl CreatinineProbeOptions {
    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.baseline_timeframe = timeframe;
        self
    }

    pub fn with_method(mut self, method: BaselineMethod) -> Self {
        self.method = method;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RrtProbeOptions {
    /// Status column, 1 while therapy is running and 0 otherwise.
    pub column: String,
    /// Name of the emitted stage column.
    pub stage_column: String,
}

impl Default for RrtProbeOptions {
    fn default() -> Self {
        Self {
            column: DEFAULT_RRT_COLUMN.to_string(),
            stage_column: "rrt_stage".to_string(),
        }
    }
}

impl RrtProbeOptions {
    /// Options for continuous renal replacement therapy flags.
    pub fn crrt() -> Self {
        Self {
            column: DEFAULT_CRRT_COLUMN.to_string(),
            stage_column: "crrt_stage".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrineOutputPreprocessOptions {
    pub column: String,
    /// Spread each reading back over the unmeasured hours preceding it.
    pub interpolate: bool,
    /// Longest gap, in hours, a reading may be spread over.
    pub threshold: usize,
}

impl Default for UrineOutputPreprocessOptions {
    fn default() -> Self {
        Self {
            column: DEFAULT_URINEOUTPUT_COLUMN.to_string(),
            interpolate: true,
            threshold: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatininePreprocessOptions {
    pub column: String,
    pub ffill: bool,
    /// Longest run of hours, after a reading, the reading is carried into.
    pub threshold: usize,
}

impl Default for CreatininePreprocessOptions {
    fn default() -> Self {
        Self {
            column: DEFAULT_CREATININE_COLUMN.to_string(),
            ffill: true,
            threshold: 72,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RrtPreprocessOptions {
    pub column: String,
}

impl Default for RrtPreprocessOptions {
    fn default() -> Self {
        Self {
            column: DEFAULT_RRT_COLUMN.to_string(),
        }
    }
}

/// One probe entry of a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeConfig {
    UrineOutput(UrineOutputProbeOptions),
    AbsoluteCreatinine(CreatinineProbeOptions),
    RelativeCreatinine(CreatinineProbeOptions),
    Rrt(RrtProbeOptions),
}

impl ProbeConfig {
    /// The probes run when nothing else is configured.
    pub fn defaults() -> Vec<ProbeConfig> {
        vec![
            ProbeConfig::UrineOutput(UrineOutputProbeOptions::default()),
            ProbeConfig::AbsoluteCreatinine(CreatinineProbeOptions::default()),
            ProbeConfig::RelativeCreatinine(CreatinineProbeOptions::default()),
            ProbeConfig::Rrt(RrtProbeOptions::default()),
        ]
    }
}

/// One preprocessor entry of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreprocessorConfig {
    TimeIndex,
    UrineOutput(UrineOutputPreprocessOptions),
    Creatinine(CreatininePreprocessOptions),
    Demographics,
    Rrt(RrtPreprocessOptions),
}

impl PreprocessorConfig {
    /// Time indexing first, then one resampler per kind.
    pub fn defaults() -> Vec<PreprocessorConfig> {
        vec![
            PreprocessorConfig::TimeIndex,
            PreprocessorConfig::UrineOutput(UrineOutputPreprocessOptions::default()),
            PreprocessorConfig::Creatinine(CreatininePreprocessOptions::default()),
            PreprocessorConfig::Demographics,
            PreprocessorConfig::Rrt(RrtPreprocessOptions::default()),
        ]
    }
}

/// Complete analyser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    pub stay_column: String,
    pub time_column: String,
    pub probes: Vec<ProbeConfig>,
    pub preprocessors: Vec<PreprocessorConfig>,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            stay_column: DEFAULT_STAY_COLUMN.to_string(),
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            probes: ProbeConfig::defaults(),
            preprocessors: PreprocessorConfig::defaults(),
        }
    }
}

impl AnalyserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stay_column(mut self, name: impl Into<String>) -> Self {
        self.stay_column = name.into();
        self
    }

    pub fn with_time_column(mut self, name: impl Into<String>) -> Self {
        self.time_column = name.into();
        self
    }

    pub fn with_probes(mut self, probes: Vec<ProbeConfig>) -> Self {
        self.probes = probes;
        self
    }

    pub fn with_preprocessors(mut self, preprocessors: Vec<PreprocessorConfig>) -> Self {
        self.preprocessors = preprocessors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_parses_units() {
        assert_eq!("7d".parse::<Timeframe>().unwrap(), Timeframe::hours(168));
        assert_eq!("36h".parse::<Timeframe>().unwrap(), Timeframe::hours(36));
        assert_eq!("2w".parse::<Timeframe>().unwrap(), Timeframe::days(14));
        assert_eq!("48".parse::<Timeframe>().unwrap(), Timeframe::days(2));
        assert_eq!(" 1 day ".parse::<Timeframe>().unwrap(), Timeframe::days(1));
    }

    #[test]
    fn timeframe_rejects_garbage() {
        assert!("".parse::<Timeframe>().is_err());
        assert!("d".parse::<Timeframe>().is_err());
        assert!("999999999999999d".parse::<Timeframe>().is_err());
        assert!("9223372036854775807h".parse::<Timeframe>().is_err());
        assert!("0h".parse::<Timeframe>().is_err());
        assert!("3 fortnights".parse::<Timeframe>().is_err());
    }

    #[test]
    fn timeframe_display_prefers_days() {
        assert_eq!(Timeframe::days(7).to_string(), "7d");
        assert_eq!(Timeframe::hours(30).to_string(), "30h");
        assert_eq!(Timeframe::days(1).as_millis(), 86_400_000);
    }
}
