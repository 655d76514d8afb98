//! Drops an earlier copy of a file when it looks identical to the new one.
//!
//! Both checks are heuristics. Equal sizes in particular can hide a real
//! change; that is accepted in exchange for not piling up redundant copies.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use filetime::FileTime;

use crate::placement::HISTORY_TIMESTAMP_FORMAT;

/// Length of a rendered [`HISTORY_TIMESTAMP_FORMAT`] stamp.
const HISTORY_STAMP_LEN: usize = "YYYY-MM-DD HH.MM.SS".len();

/// Delete `previous` if both files carry the same modified time, to the second.
/// Returns whether a copy was deleted.
pub fn collapse_by_timestamp(target: &Path, previous: Option<&Path>) -> io::Result<bool> {
    let Some(previous) = previous else {
        return Ok(false);
    };

    if modified_secs(previous)? != modified_secs(target)? {
        return Ok(false);
    }

    fs::remove_file(previous)?;
    tracing::info!(path = %previous.display(), "removed identical earlier copy (timestamp)");
    Ok(true)
}

/// Delete `previous` if both files have the same size.
/// Returns whether a copy was deleted.
pub fn collapse_by_size(target: &Path, previous: Option<&Path>) -> io::Result<bool> {
    let Some(previous) = previous else {
        return Ok(false);
    };

    if fs::metadata(previous)?.len() != fs::metadata(target)?.len() {
        return Ok(false);
    }

    fs::remove_file(previous)?;
    tracing::info!(path = %previous.display(), "removed identical earlier copy (size)");
    Ok(true)
}

fn modified_secs(path: &Path) -> io::Result<i64> {
    let meta = fs::metadata(path)?;
    Ok(FileTime::from_last_modification_time(&meta).unix_seconds())
}

/// Name of the current file an earlier copy was renamed from.
///
/// `essay (2019-06-01 22.37.25).docx` -> `essay.docx`
pub fn current_name_for(history_name: &str) -> Option<String> {
    for (idx, _) in history_name.rmatch_indices(" (") {
        let rest = &history_name[idx + 2..];
        let Some(stamp) = rest.get(..HISTORY_STAMP_LEN) else {
            continue;
        };
        let Some(ext) = rest[HISTORY_STAMP_LEN..].strip_prefix(')') else {
            continue;
        };
        if !(ext.is_empty() || ext.starts_with('.')) {
            continue;
        }
        if NaiveDateTime::parse_from_str(stamp, HISTORY_TIMESTAMP_FORMAT).is_err() {
            continue;
        }

        let current = format!("{}{ext}", &history_name[..idx]);
        if current.is_empty() {
            return None;
        }
        return Some(current);
    }

    None
}

/// Size-based sweep over every student folder of an assignment.
///
/// Each earlier copy is compared against the current file it was renamed
/// from, and deleted when the sizes match. This never runs as part of a
/// sync; callers invoke it explicitly. Returns the deleted paths, sorted.
pub fn sweep_by_size(assignment_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for student in fs::read_dir(assignment_dir)? {
        let student = student?;
        if !student.file_type()?.is_dir() {
            continue;
        }

        for entry in fs::read_dir(student.path())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(current) = current_name_for(&name.to_string_lossy()) else {
                continue;
            };

            let current = student.path().join(current);
            if !current.is_file() {
                continue;
            }

            let previous = entry.path();
            if collapse_by_size(&current, Some(&previous))? {
                removed.push(previous);
            }
        }
    }

    removed.sort();
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_previous_copy_is_never_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.txt");
        std::fs::write(&target, b"a").unwrap();

        assert!(!collapse_by_timestamp(&target, None).unwrap());
        assert!(!collapse_by_size(&target, None).unwrap());
        assert!(target.exists());
    }

    #[test]
    fn no_previous_copy_does_not_touch_missing_target() {
        let missing = Path::new("/definitely/not/here.txt");
        assert!(!collapse_by_timestamp(missing, None).unwrap());
        assert!(!collapse_by_size(missing, None).unwrap());
    }

    #[test]
    fn parses_history_name_with_extension() {
        assert_eq!(
            current_name_for("essay (2019-06-01 22.37.25).docx").as_deref(),
            Some("essay.docx")
        );
    }

    #[test]
    fn parses_history_name_without_extension() {
        assert_eq!(
            current_name_for("Makefile (2019-06-01 22.37.25)").as_deref(),
            Some("Makefile")
        );
    }

    #[test]
    fn parses_history_of_exported_document() {
        assert_eq!(
            current_name_for("Essay (document) (2020-01-02 03.04.05).pdf").as_deref(),
            Some("Essay (document).pdf")
        );
    }

    #[test]
    fn ignores_names_without_history_stamp() {
        assert_eq!(current_name_for("Essay (document).pdf"), None);
        assert_eq!(current_name_for("notes (2019-13-01 22.37.25).txt"), None);
        assert_eq!(current_name_for("notes (2019-06-01 22:37:25).txt"), None);
        assert_eq!(current_name_for("plain.txt"), None);
        assert_eq!(current_name_for(" (2019-06-01 22.37.25)"), None);
    }
}
