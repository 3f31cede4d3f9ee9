//! Output side of the staging pipeline.
//!
//! - **CSV**: the staged table as written by the `aki` tool
//! - **Summary**: highest stage reached per stay

mod csv_output;
mod summary;

pub use csv_output::{RESULT_FILE_NAME, default_output_path, write_result_csv};
pub use summary::{StageSummary, StayStage};
