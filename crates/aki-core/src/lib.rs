pub mod analyser;
pub mod frame;
pub mod preprocess;
pub mod probes;
pub mod series;
pub mod time;

pub use analyser::{Analyser, STAGE_COLUMN};
pub use frame::{Dataset, FrameKeys};
pub use preprocess::{
    CreatininePreprocessor, DemographicsPreprocessor, Preprocessor, RrtPreprocessor,
    TimeIndexCreator, UrineOutputPreprocessor,
};
pub use probes::{
    ABS_CREATININE_STAGE, CreatinineProbe, Probe, REL_CREATININE_STAGE, RrtProbe,
    URINEOUTPUT_STAGE, UrineOutputProbe,
};
pub use series::approx_gte;
pub use time::{format_timestamp, parse_timestamp};
