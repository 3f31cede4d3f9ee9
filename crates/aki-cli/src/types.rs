use std::path::PathBuf;

use aki_cli::load::LoadedFile;
use aki_report::StageSummary;

#[derive(Debug)]
pub struct RunResult {
    pub folder: PathBuf,
    pub output: PathBuf,
    pub files: Vec<LoadedFile>,
    pub summary: StageSummary,
}
