//! Tests for dataset file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use aki_ingest::{DatasetFileNames, IngestError, discover_dataset_files, list_csv_files};
use aki_model::DatasetKind;
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "stay_id\n1\n").expect("write file");
    path
}

#[test]
fn lists_csv_files_sorted() {
    let dir = TempDir::new().expect("temp dir");
    touch(dir.path(), "b.csv");
    touch(dir.path(), "a.CSV");
    touch(dir.path(), "notes.txt");
    fs::create_dir(dir.path().join("nested.csv")).expect("mkdir");

    let files = list_csv_files(dir.path()).expect("list csv");
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.CSV", "b.csv"]);
}

#[test]
fn discovers_present_datasets() {
    let dir = TempDir::new().expect("temp dir");
    touch(dir.path(), "urineoutput.csv");
    touch(dir.path(), "demographics.csv");
    touch(dir.path(), "aki.csv");

    let discovery =
        discover_dataset_files(dir.path(), &DatasetFileNames::default()).expect("discover");
    let kinds: Vec<_> = discovery.datasets.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds, vec![DatasetKind::UrineOutput, DatasetKind::Demographics]);
    let missing: Vec<_> = discovery.missing.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(
        missing,
        vec![DatasetKind::Creatinine, DatasetKind::RenalReplacementTherapy]
    );
    assert_eq!(discovery.unused.len(), 1);
    assert!(discovery.unused[0].ends_with("aki.csv"));
}

#[test]
fn custom_file_names() {
    let dir = TempDir::new().expect("temp dir");
    touch(dir.path(), "scr.csv");
    let names = DatasetFileNames {
        creatinine: "scr.csv".to_string(),
        ..DatasetFileNames::default()
    };
    let discovery = discover_dataset_files(dir.path(), &names).expect("discover");
    assert_eq!(discovery.datasets.len(), 1);
    assert_eq!(discovery.datasets[0].0, DatasetKind::Creatinine);
}

#[test]
fn empty_folder_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = discover_dataset_files(dir.path(), &DatasetFileNames::default()).unwrap_err();
    assert!(matches!(err, IngestError::NoDatasets { .. }));
}

#[test]
fn missing_folder_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = list_csv_files(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}
