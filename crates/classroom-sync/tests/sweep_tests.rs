use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use classroom_sync::placement::{rename_existing, restore_modified_time};
use classroom_sync::sync::DEFAULT_UTC_OFFSET;
use classroom_sync::{collapse_by_size, collapse_by_timestamp, sweep_by_size};

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn timestamp_match_deletes_previous_copy() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("essay.docx");
    let previous = dir.path().join("essay (2019-06-01 22.37.25).docx");
    write(&target, "new bytes");
    write(&previous, "old");
    let stamp = Utc.with_ymd_and_hms(2019, 6, 1, 20, 37, 25).unwrap();
    restore_modified_time(&target, stamp).unwrap();
    restore_modified_time(&previous, stamp).unwrap();

    assert!(collapse_by_timestamp(&target, Some(&previous)).unwrap());
    assert!(!previous.exists());
    assert!(target.exists());
}

#[test]
fn timestamp_mismatch_keeps_previous_copy() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("essay.docx");
    let previous = dir.path().join("essay (2019-06-01 22.37.25).docx");
    write(&target, "same");
    write(&previous, "same");
    restore_modified_time(&target, Utc.with_ymd_and_hms(2019, 6, 2, 0, 0, 0).unwrap()).unwrap();
    restore_modified_time(&previous, Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap()).unwrap();

    assert!(!collapse_by_timestamp(&target, Some(&previous)).unwrap());
    assert!(previous.exists());
}

#[test]
fn size_check_is_independent_of_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("lab.py");
    let previous = dir.path().join("lab (2019-06-01 22.37.25).py");
    write(&target, "abcd");
    write(&previous, "wxyz");
    restore_modified_time(&target, Utc.with_ymd_and_hms(2019, 6, 2, 0, 0, 0).unwrap()).unwrap();

    assert!(collapse_by_size(&target, Some(&previous)).unwrap());
    assert!(!previous.exists());
}

#[test]
fn size_mismatch_keeps_previous_copy() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("lab.py");
    let previous = dir.path().join("lab (2019-06-01 22.37.25).py");
    write(&target, "longer content");
    write(&previous, "short");

    assert!(!collapse_by_size(&target, Some(&previous)).unwrap());
    assert!(previous.exists());
}

#[test]
fn sweep_removes_only_same_size_history() {
    let dir = tempfile::tempdir().unwrap();
    let assignment = dir.path().join("Programmering 1").join("Lab 1");
    let ann = assignment.join("Ann Berg");
    let bo = assignment.join("Bo Ek");

    write(&ann.join("essay.docx"), "12345");
    write(&ann.join("essay (2019-06-01 22.37.25).docx"), "abcde");
    write(&ann.join("essay (2019-05-01 10.00.00).docx"), "abc");
    write(&bo.join("Report (document).pdf"), "pdf!");
    write(&bo.join("Report (document) (2019-06-01 08.00.00).pdf"), "pdf?");
    write(&bo.join("orphan (2019-06-01 08.00.00).txt"), "no current file");
    write(&assignment.join("stray.txt"), "not a student folder");

    let removed = sweep_by_size(&assignment).unwrap();

    assert_eq!(
        removed,
        vec![
            ann.join("essay (2019-06-01 22.37.25).docx"),
            bo.join("Report (document) (2019-06-01 08.00.00).pdf"),
        ]
    );
    assert_eq!(
        names(&ann),
        vec!["essay (2019-05-01 10.00.00).docx", "essay.docx"]
    );
    assert_eq!(
        names(&bo),
        vec!["Report (document).pdf", "orphan (2019-06-01 08.00.00).txt"]
    );
}

#[test]
fn renamed_copy_is_found_by_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let student = dir.path().join("Ann Berg");
    let current = student.join("notes.txt");
    write(&current, "same size");

    let previous = rename_existing(&current, &DEFAULT_UTC_OFFSET).unwrap();
    write(&current, "SAME SIZE");

    let removed = sweep_by_size(dir.path()).unwrap();
    assert_eq!(removed, vec![previous]);
    assert_eq!(names(&student), vec!["notes.txt"]);
}

#[test]
fn sweep_of_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(sweep_by_size(&dir.path().join("nope")).is_err());
}
