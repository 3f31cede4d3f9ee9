use std::fs;
use std::path::PathBuf;

use polars::prelude::*;
use tempfile::TempDir;

use aki_ingest::{build_column_hints, read_csv_frame, read_csv_table};

fn temp_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_table_and_builds_hints() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "test.csv", "A,B,C\n1,x,\n2,x,2.5\n");
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.headers, vec!["A", "B", "C"]);
    assert_eq!(table.rows.len(), 2);
    let hints = build_column_hints(&table);

    let a = hints.get("A").expect("A hint");
    assert!(a.is_numeric);
    assert!(a.is_integer);
    assert!((a.null_ratio - 0.0).abs() < 1e-6);

    let b = hints.get("B").expect("B hint");
    assert!(!b.is_numeric);

    let c = hints.get("C").expect("C hint");
    assert!(c.is_numeric);
    assert!(!c.is_integer);
    assert!((c.null_ratio - 0.5).abs() < 1e-6);
}

#[test]
fn frame_columns_are_typed() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(
        &dir,
        "urineoutput.csv",
        "stay_id,charttime,urineoutput\n\
         1,2023-01-01 00:00:00,50\n\
         1,2023-01-01 01:00:00,NaN\n\
         2,2023-01-01 00:30:00,12.5\n",
    );
    let frame = read_csv_frame(&path).expect("read frame");
    assert_eq!(frame.height(), 3);
    assert_eq!(frame.column("stay_id").unwrap().dtype(), &DataType::Int64);
    assert_eq!(frame.column("charttime").unwrap().dtype(), &DataType::String);
    let uo = frame.column("urineoutput").unwrap();
    assert_eq!(uo.dtype(), &DataType::Float64);
    assert_eq!(uo.null_count(), 1);
    assert_eq!(uo.f64().unwrap().get(2), Some(12.5));
}

#[test]
fn unnamed_index_column_and_blank_lines() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "demographics.csv", ",stay_id,weight\n0,1,80\n\n1,2,\n");
    let frame = read_csv_frame(&path).expect("read frame");
    assert_eq!(frame.height(), 2);
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["unnamed_0", "stay_id", "weight"]);
    assert_eq!(frame.column("weight").unwrap().i64().unwrap().get(1), None);
}

#[test]
fn empty_file_gives_empty_frame() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "rrt.csv", "");
    let frame = read_csv_frame(&path).expect("read frame");
    assert_eq!(frame.height(), 0);
    assert_eq!(frame.width(), 0);
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = read_csv_frame(&dir.path().join("absent.csv")).unwrap_err();
    assert!(err.to_string().contains("read csv"));
}
