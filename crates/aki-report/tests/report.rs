use std::fs;

use polars::prelude::*;

use aki_core::FrameKeys;
use aki_model::StayId;
use aki_report::{RESULT_FILE_NAME, StageSummary, default_output_path, write_result_csv};

const HOUR_MS: i64 = 3_600_000;
// 2023-01-01 00:00:00 UTC
const START_MS: i64 = 1_672_531_200_000;

fn result_frame() -> DataFrame {
    let times = Series::new(
        "charttime".into(),
        vec![START_MS, START_MS + HOUR_MS, START_MS + 2 * HOUR_MS, START_MS],
    )
    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
    .unwrap();
    DataFrame::new(vec![
        Series::new("stay_id".into(), vec![1i64, 1, 1, 2]).into(),
        times.into(),
        Series::new("urineoutput".into(), vec![Some(40.0), Some(12.5), None, Some(100.0)]).into(),
        Series::new("stage".into(), vec![Some(0i64), Some(2), Some(1), None]).into(),
    ])
    .unwrap()
}

#[test]
fn writes_formatted_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("result.csv");
    let written = write_result_csv(&path, &result_frame()).expect("write");
    assert_eq!(written, path);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "stay_id,charttime,urineoutput,stage",
            "1,2023-01-01 00:00:00,40,0",
            "1,2023-01-01 01:00:00,12.5,2",
            "1,2023-01-01 02:00:00,,1",
            "2,2023-01-01 00:00:00,100,",
        ]
    );
}

#[test]
fn default_output_sits_in_input_folder() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        default_output_path(dir.path()),
        dir.path().join(RESULT_FILE_NAME)
    );
}

#[test]
fn summary_reports_highest_stage_per_stay() {
    let summary = StageSummary::from_frame(&result_frame(), &FrameKeys::default()).expect("summary");
    assert_eq!(summary.row_count, 4);
    assert_eq!(summary.stay_count(), 2);

    let first = &summary.stays[0];
    assert_eq!(first.stay, StayId::Int(1));
    assert_eq!(first.hours, 3);
    assert_eq!(first.max_stage, Some(2));
    assert_eq!(first.first_aki, Some(START_MS + HOUR_MS));

    let second = &summary.stays[1];
    assert_eq!(second.max_stage, None);
    assert_eq!(second.first_aki, None);

    assert_eq!(summary.stays_at_stage(2), 1);
    assert_eq!(summary.stays_at_stage(0), 0);
    assert_eq!(summary.stays_without_stage(), 1);
    assert_eq!(summary.aki_count(), 1);
}

#[test]
fn empty_result_summarises_to_nothing() {
    let summary = StageSummary::from_frame(&DataFrame::empty(), &FrameKeys::default()).expect("summary");
    assert_eq!(summary, StageSummary::default());
}
