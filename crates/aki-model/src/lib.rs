pub mod error;
pub mod kind;
pub mod options;
pub mod stay;

pub use error::{AkiError, Result};
pub use kind::DatasetKind;
pub use options::{
    AnalyserConfig, BaselineMethod, CreatininePreprocessOptions, CreatinineProbeOptions,
    DEFAULT_CREATININE_COLUMN, DEFAULT_CRRT_COLUMN, DEFAULT_RRT_COLUMN, DEFAULT_STAY_COLUMN,
    DEFAULT_TIME_COLUMN, DEFAULT_URINEOUTPUT_COLUMN, DEFAULT_WEIGHT_COLUMN, PreprocessorConfig,
    ProbeConfig, RrtPreprocessOptions, RrtProbeOptions, Timeframe, UrineOutputMethod,
    UrineOutputPreprocessOptions, UrineOutputProbeOptions,
};
pub use stay::StayId;
