//! KDIGO criteria evaluated on one stay's hourly datasets.
//!
//! A probe runs only when every dataset kind it requires is present. It adds
//! its stage column to the table of the first required kind and returns the
//! list otherwise untouched.

mod creatinine;
mod rrt;
mod urine_output;

use anyhow::{Context, Result};
use tracing::debug;

use aki_model::{DatasetKind, ProbeConfig};

use crate::frame::{Dataset, FrameKeys, find_dataset};

pub use creatinine::{
    ABS_CREATININE_STAGE, CreatinineProbe, REL_CREATININE_STAGE, absolute_stages,
    creatinine_baseline, relative_stages,
};
pub use rrt::{RrtProbe, rrt_stages};
pub use urine_output::{URINEOUTPUT_STAGE, UrineOutputProbe, urine_output_stages};

#[derive(Debug, Clone)]
pub enum Probe {
    UrineOutput(UrineOutputProbe),
    AbsoluteCreatinine(CreatinineProbe),
    RelativeCreatinine(CreatinineProbe),
    Rrt(RrtProbe),
}

impl Probe {
    pub fn from_config(config: &ProbeConfig, keys: &FrameKeys) -> Self {
        match config {
            ProbeConfig::UrineOutput(options) => {
                Probe::UrineOutput(UrineOutputProbe::new(options.clone()))
            }
            ProbeConfig::AbsoluteCreatinine(options) => Probe::AbsoluteCreatinine(
                CreatinineProbe::new(options.clone()).with_time_column(&keys.time_column),
            ),
            ProbeConfig::RelativeCreatinine(options) => Probe::RelativeCreatinine(
                CreatinineProbe::new(options.clone()).with_time_column(&keys.time_column),
            ),
            ProbeConfig::Rrt(options) => Probe::Rrt(RrtProbe::new(options.clone())),
        }
    }

    pub fn defaults(keys: &FrameKeys) -> Vec<Probe> {
        ProbeConfig::defaults()
            .iter()
            .map(|config| Probe::from_config(config, keys))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Probe::UrineOutput(_) => "urineoutput",
            Probe::AbsoluteCreatinine(_) => "absolute_creatinine",
            Probe::RelativeCreatinine(_) => "relative_creatinine",
            Probe::Rrt(_) => "rrt",
        }
    }

    /// Name of the stage column this probe adds.
    pub fn stage_column(&self) -> &str {
        match self {
            Probe::UrineOutput(_) => URINEOUTPUT_STAGE,
            Probe::AbsoluteCreatinine(_) => ABS_CREATININE_STAGE,
            Probe::RelativeCreatinine(_) => REL_CREATININE_STAGE,
            Probe::Rrt(inner) => inner.stage_column(),
        }
    }

    /// Kinds that must all be present; the first one receives the stage column.
    pub fn required_kinds(&self) -> &'static [DatasetKind] {
        match self {
            Probe::UrineOutput(_) => &[DatasetKind::UrineOutput, DatasetKind::Demographics],
            Probe::AbsoluteCreatinine(_) | Probe::RelativeCreatinine(_) => {
                &[DatasetKind::Creatinine]
            }
            Probe::Rrt(_) => &[DatasetKind::RenalReplacementTherapy],
        }
    }

    pub fn probe(&self, mut datasets: Vec<Dataset>) -> Result<Vec<Dataset>> {
        let mut positions = Vec::with_capacity(2);
        for kind in self.required_kinds() {
            match find_dataset(&datasets, *kind)? {
                Some(position) => positions.push(position),
                None => {
                    debug!(probe = self.name(), missing = %kind, "skip probe");
                    return Ok(datasets);
                }
            }
        }
        let owned = &datasets[positions[0]];
        let table = match self {
            Probe::UrineOutput(inner) => {
                inner.apply(&owned.table, &datasets[positions[1]].table)
            }
            Probe::AbsoluteCreatinine(inner) => inner.apply_absolute(&owned.table),
            Probe::RelativeCreatinine(inner) => inner.apply_relative(&owned.table),
            Probe::Rrt(inner) => inner.apply(&owned.table),
        }
        .with_context(|| format!("run {} probe", self.name()))?;
        let updated = owned.with_table(table);
        datasets[positions[0]] = updated;
        Ok(datasets)
    }
}
