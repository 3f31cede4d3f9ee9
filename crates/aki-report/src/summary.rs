use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::DataFrame;

use aki_core::frame::{has_column, numeric_column_i64, stay_column, timestamp_column};
use aki_core::{FrameKeys, STAGE_COLUMN};
use aki_model::StayId;

/// Staging outcome of one stay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayStage {
    pub stay: StayId,
    /// Hourly rows in the result table.
    pub hours: usize,
    /// Highest overall stage; `None` when no hour could be staged.
    pub max_stage: Option<i64>,
    /// Epoch milliseconds of the first hour with stage 1 or higher.
    pub first_aki: Option<i64>,
}

/// Per-stay digest of a result table, in stay order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub stays: Vec<StayStage>,
    pub row_count: usize,
}

impl StageSummary {
    pub fn from_frame(df: &DataFrame, keys: &FrameKeys) -> Result<Self> {
        if df.height() == 0 || !has_column(df, &keys.stay_column) {
            return Ok(Self::default());
        }
        let stays = stay_column(df, &keys.stay_column)?;
        let stages = if has_column(df, STAGE_COLUMN) {
            numeric_column_i64(df, STAGE_COLUMN)?
        } else {
            vec![None; df.height()]
        };
        let times = if has_column(df, &keys.time_column) {
            timestamp_column(df, &keys.time_column)?
        } else {
            vec![None; df.height()]
        };

        let mut summary: BTreeMap<StayId, StayStage> = BTreeMap::new();
        for ((stay, stage), time) in stays.into_iter().zip(stages).zip(times) {
            let Some(stay) = stay else {
                continue;
            };
            let entry = summary.entry(stay.clone()).or_insert_with(|| StayStage {
                stay,
                hours: 0,
                max_stage: None,
                first_aki: None,
            });
            entry.hours += 1;
            entry.max_stage = entry.max_stage.max(stage);
            if stage.is_some_and(|s| s > 0)
                && let Some(time) = time
            {
                entry.first_aki = Some(entry.first_aki.map_or(time, |first| first.min(time)));
            }
        }
        Ok(Self {
            stays: summary.into_values().collect(),
            row_count: df.height(),
        })
    }

    pub fn stay_count(&self) -> usize {
        self.stays.len()
    }

    /// Stays whose highest stage is exactly `stage`.
    pub fn stays_at_stage(&self, stage: i64) -> usize {
        self.stays
            .iter()
            .filter(|entry| entry.max_stage == Some(stage))
            .count()
    }

    pub fn stays_without_stage(&self) -> usize {
        self.stays.iter().filter(|entry| entry.max_stage.is_none()).count()
    }

    /// Stays that reached any AKI stage.
    pub fn aki_count(&self) -> usize {
        self.stays
            .iter()
            .filter(|entry| entry.max_stage.is_some_and(|s| s > 0))
            .count()
    }
}
