//! Integration tests for folder loading and a full staging run.

use std::fs;
use std::path::Path;

use aki_cli::load::{load_config, load_datasets};
use aki_core::{Analyser, STAGE_COLUMN};
use aki_ingest::DatasetFileNames;
use aki_model::{DatasetKind, ProbeConfig, UrineOutputMethod};
use aki_report::{StageSummary, default_output_path, write_result_csv};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn urine_csv() -> String {
    // written with a leading row index, as dataframe libraries tend to do
    let mut text = String::from(",stay_id,charttime,urineoutput\n");
    for hour in 0..12 {
        text.push_str(&format!("{hour},1,2023-01-01 {hour:02}:10:00,10\n"));
    }
    text
}

#[test]
fn loads_present_files_only() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "urineoutput.csv", &urine_csv());
    write(dir.path(), "demographics.csv", "stay_id,weight\n1,100\n");
    write(dir.path(), "notes.csv", "a\n1\n");

    let input = load_datasets(dir.path(), &DatasetFileNames::default()).expect("load");
    let kinds: Vec<DatasetKind> = input.datasets.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DatasetKind::UrineOutput, DatasetKind::Demographics]);
    assert_eq!(input.files[0].records, 12);

    let urine = &input.datasets[0].table;
    let names: Vec<String> = urine.get_column_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["stay_id", "charttime", "urineoutput"]);
}

#[test]
fn empty_folder_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_datasets(dir.path(), &DatasetFileNames::default()).unwrap_err();
    assert!(format!("{err:#}").contains("discover datasets"));
}

#[test]
fn custom_file_names_are_honoured() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "crrt.csv", "stay_id,charttime,rrt_status\n1,2023-01-01 00:00,1\n");
    let names = DatasetFileNames {
        rrt: "crrt.csv".to_string(),
        ..DatasetFileNames::default()
    };
    let input = load_datasets(dir.path(), &names).expect("load");
    assert_eq!(input.datasets.len(), 1);
    assert_eq!(input.datasets[0].kind, DatasetKind::RenalReplacementTherapy);
}

#[test]
fn config_defaults_without_file() {
    let config = load_config(None).expect("config");
    assert_eq!(config.probes.len(), 4);
}

#[test]
fn config_file_is_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"time_column": "time", "probes": [{"kind": "urine_output", "method": "strict"}]}"#,
    )
    .unwrap();
    let config = load_config(Some(&path)).expect("config");
    assert_eq!(config.time_column, "time");
    assert!(matches!(
        &config.probes[..],
        [ProbeConfig::UrineOutput(options)] if options.method == UrineOutputMethod::Strict
    ));

    fs::write(&path, "{not json").unwrap();
    assert!(load_config(Some(&path)).is_err());
}

#[test]
fn folder_to_result_csv() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "urineoutput.csv", &urine_csv());
    write(
        dir.path(),
        "creatinine.csv",
        "stay_id,charttime,creat\n1,2023-01-01 00:05,1.0\n1,2023-01-01 06:05,2.1\n",
    );
    write(dir.path(), "rrt.csv", "stay_id,charttime,rrt_status\n1,2023-01-01 11:00,1\n");
    write(dir.path(), "demographics.csv", "stay_id,weight\n1,100\n2,80\n");

    let input = load_datasets(dir.path(), &DatasetFileNames::default()).expect("load");
    let analyser = Analyser::with_defaults(input.datasets).expect("analyser");
    let result = analyser.process_stays().expect("process");
    let output = default_output_path(dir.path());
    write_result_csv(&output, &result).expect("write");

    let text = fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some(
            "stay_id,charttime,urineoutput,urineoutput_stage,creat,abs_creatinine_stage,\
             rel_creatinine_stage,rrt_status,rrt_stage,weight,stage"
        )
    );
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0], "1,2023-01-01 00:00:00,10,0,1,0,0,,,100,0");
    assert!(rows[11].ends_with(",3"));

    let summary = StageSummary::from_frame(&result, analyser.keys()).expect("summary");
    assert_eq!(summary.stay_count(), 1);
    assert_eq!(summary.stays_at_stage(3), 1);
    assert!(result.column(STAGE_COLUMN).is_ok());
}
