use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use filetime::FileTime;

use crate::file::RemoteFile;
use crate::roster::normalize_name;

/// Characters that are not allowed in a path segment.
const UNSAFE_CHARS: [char; 9] = ['/', '\\', '?', '*', ':', '|', '"', '<', '>'];

/// Timestamp embedded in the name of a renamed earlier copy.
/// Colons are not filesystem-safe everywhere, so the time uses dots.
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Where an assignment's files are placed.
///
/// Layout: `root/<course>/<assignment>/<student>/<file>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub root: PathBuf,
    pub course: String,
    pub assignment: String,
}

impl Destination {
    pub fn new(
        root: impl Into<PathBuf>,
        course: impl Into<String>,
        assignment: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            course: course.into(),
            assignment: assignment.into(),
        }
    }

    pub fn assignment_dir(&self) -> PathBuf {
        self.root
            .join(sanitize_filename(&self.course))
            .join(sanitize_filename(&self.assignment))
    }

    /// Directory for one student. The name is unicode-normalized first so
    /// differently encoded spellings land in the same folder.
    pub fn student_dir(&self, student: &str) -> PathBuf {
        self.assignment_dir()
            .join(sanitize_filename(&normalize_name(student)))
    }
}

/// Result of resolving a remote file to a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPlacement {
    pub target_path: PathBuf,
    /// Where the copy that previously sat at `target_path` was moved to.
    pub previous_copy: Option<PathBuf>,
}

impl LocalPlacement {
    pub fn was_renamed(&self) -> bool {
        self.previous_copy.is_some()
    }

    /// Undo a placement whose transfer did not complete: drop whatever was
    /// written to `target_path` and move the earlier copy back.
    pub fn roll_back(&self) -> io::Result<()> {
        match fs::remove_file(&self.target_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        if let Some(previous) = &self.previous_copy {
            fs::rename(previous, &self.target_path)?;
            tracing::debug!(path = %self.target_path.display(), "restored earlier copy");
        }
        Ok(())
    }
}

/// Replace every character in `/ \ ? * : | " < >` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Local filename for a remote file.
///
/// Binary files keep their original filename. Native documents are exported
/// to `<title> (<mime suffix>).pdf`; the suffix keeps a document and a
/// spreadsheet with the same title apart.
pub fn target_filename(file: &RemoteFile) -> String {
    match &file.original_filename {
        Some(name) => sanitize_filename(name),
        None => sanitize_filename(&format!("{} ({}).pdf", file.name, file.mime_suffix())),
    }
}

/// Filename for a file whose [`target_filename`] is already taken by another
/// file of the same student: `lab1 (<id>).py`.
pub fn disambiguated_filename(file: &RemoteFile) -> String {
    let name = target_filename(file);
    let id = sanitize_filename(file.id.as_str());
    let path = Path::new(&name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{} ({id}).{}",
            stem.to_string_lossy(),
            ext.to_string_lossy()
        ),
        _ => format!("{name} ({id})"),
    }
}

/// Pick the target path for `file` inside `student_dir`, moving any
/// existing file at that path out of the way first.
pub fn resolve_placement(
    student_dir: &Path,
    file: &RemoteFile,
    offset: &FixedOffset,
) -> io::Result<LocalPlacement> {
    place_at(student_dir.join(target_filename(file)), offset)
}

/// Like [`resolve_placement`] for an already chosen `target_path`.
pub fn place_at(target_path: PathBuf, offset: &FixedOffset) -> io::Result<LocalPlacement> {
    let previous_copy = if target_path.exists() {
        Some(rename_existing(&target_path, offset)?)
    } else {
        None
    };

    Ok(LocalPlacement {
        target_path,
        previous_copy,
    })
}

/// `dir/essay.docx` modified at `t` -> `dir/essay (YYYY-MM-DD HH.MM.SS).docx`
pub fn history_path(path: &Path, modified: DateTime<FixedOffset>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    path.with_file_name(format!(
        "{stem} ({}){ext}",
        modified.format(HISTORY_TIMESTAMP_FORMAT)
    ))
}

/// Rename `path` to its history name, stamped with its own modified time
/// rendered in `offset`. Returns the new path.
pub fn rename_existing(path: &Path, offset: &FixedOffset) -> io::Result<PathBuf> {
    let modified: DateTime<Utc> = fs::metadata(path)?.modified()?.into();
    let previous = history_path(path, modified.with_timezone(offset));
    fs::rename(path, &previous)?;
    tracing::debug!(from = %path.display(), to = %previous.display(), "kept earlier copy");
    Ok(previous)
}

/// Stamp `path` with the remote modified time, as both access and
/// modification time. Transfers otherwise leave the current time behind.
pub fn restore_modified_time(path: &Path, modified: DateTime<Utc>) -> io::Result<()> {
    let time = FileTime::from_unix_time(modified.timestamp(), modified.timestamp_subsec_nanos());
    filetime::set_file_times(path, time, time)
}
