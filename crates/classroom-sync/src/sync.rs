use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::FixedOffset;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::dedup::{Deduplicated, dedupe};
use crate::feedback::Feedback;
use crate::file::{FileId, RemoteFile, Submission, TransferKind};
use crate::placement::{
    Destination, disambiguated_filename, place_at, restore_modified_time, target_filename,
};
use crate::revision::collapse_by_timestamp;
use crate::roster::{Roster, normalize_name};
use crate::transfer::Transfer;

/// Worker pool width used when nothing else is configured.
pub const DEFAULT_WORKERS: usize = 4;

/// Format native documents are exported to.
pub const EXPORT_MIME: &str = "application/pdf";

/// UTC+02:00, the offset of the reference deployment.
pub const DEFAULT_UTC_OFFSET: FixedOffset = match FixedOffset::east_opt(2 * 3600) {
    Some(offset) => offset,
    None => panic!("offset out of range"),
};

/// Errors that abort a sync (or, for contract violations, skip a file).
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("file {0} has neither a sharing user nor an owner")]
    ContractViolation(FileId),

    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// How many files are transferred at once.
    pub workers: usize,
    /// Offset used when stamping renamed earlier copies.
    pub utc_offset: FixedOffset,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            utc_offset: DEFAULT_UTC_OFFSET,
        }
    }
}

/// One file whose pipeline stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub cause: String,
}

impl FileFailure {
    fn new(path: &Path, cause: impl std::fmt::Display) -> Self {
        Self {
            path: path.to_owned(),
            cause: cause.to_string(),
        }
    }
}

/// Aggregate outcome of synchronizing one assignment.
#[derive(Debug, Default)]
pub struct SyncResult {
    /// Files that made it through the whole pipeline.
    pub total_processed: u64,
    /// Files without an identical earlier copy, in completion order.
    pub new_or_changed: Vec<PathBuf>,
    /// Checksum -> placed files carrying it.
    pub checksum_index: BTreeMap<String, Vec<PathBuf>>,
    pub failures: Vec<FileFailure>,
    /// Normalized display names of every student with at least one file.
    pub students: BTreeSet<String>,
    /// Roster students with no files at all.
    pub missing_students: BTreeSet<String>,
    /// Stale revisions dropped from the listing.
    pub duplicates_ignored: u64,
    pub feedback: Vec<Feedback>,
}

impl SyncResult {
    /// Groups of files sharing a checksum, i.e. the same bytes placed more
    /// than once. Informational; nothing is deleted because of it.
    pub fn checksum_collisions(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.checksum_index
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(checksum, paths)| (checksum.as_str(), paths.as_slice()))
    }

    fn record(&mut self, placed: PlacedFile) {
        self.total_processed += 1;
        if let Some(checksum) = placed.checksum {
            self.checksum_index
                .entry(checksum)
                .or_default()
                .push(placed.path.clone());
        }
        if !placed.collapsed {
            self.new_or_changed.push(placed.path);
        }
    }
}

/// A file that went through the whole pipeline.
struct PlacedFile {
    path: PathBuf,
    collapsed: bool,
    checksum: Option<String>,
}

/// Places an assignment's remote files on disk.
pub struct Synchronizer {
    transfer: Arc<dyn Transfer>,
    options: SyncOptions,
    roster: Roster,
}

impl Synchronizer {
    pub fn new(transfer: Arc<dyn Transfer>) -> Self {
        Self {
            transfer,
            options: SyncOptions::default(),
            roster: Roster::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    /// Synchronize `files` into `destination`.
    ///
    /// Stale revisions are dropped, student folders are created up front,
    /// then every file is placed by a bounded pool of workers. A failing file
    /// is recorded on the result and never stops the others. Only failing to
    /// create a student folder aborts the run.
    pub async fn synchronize(
        &self,
        files: Vec<RemoteFile>,
        destination: &Destination,
    ) -> Result<SyncResult, SyncError> {
        let Deduplicated {
            submissions,
            ignored,
            mut feedback,
        } = dedupe(files);

        let students = create_student_dirs(&submissions, destination)?;
        let planned = assign_targets(submissions, destination, &mut feedback);
        tracing::debug!(
            files = planned.len(),
            students = students.len(),
            workers = self.options.workers,
            "starting transfers"
        );

        let result = Arc::new(Mutex::new(SyncResult {
            students,
            duplicates_ignored: ignored,
            feedback,
            ..SyncResult::default()
        }));

        let workers = self.options.workers.max(1);
        let mut tasks = JoinSet::new();
        for (submission, target_path) in planned {
            while tasks.len() >= workers {
                reap(tasks.join_next().await, &result).await;
            }

            let transfer = Arc::clone(&self.transfer);
            let offset = self.options.utc_offset;
            let result = Arc::clone(&result);

            tasks.spawn(async move {
                let outcome = place_file(&*transfer, &submission, target_path, &offset).await;
                let mut result = result.lock().await;
                match outcome {
                    Ok(placed) => result.record(placed),
                    Err(failure) => {
                        tracing::warn!(
                            path = %failure.path.display(),
                            cause = %failure.cause,
                            "transfer failed"
                        );
                        result.failures.push(failure);
                    }
                }
            });
        }
        while let Some(joined) = tasks.join_next().await {
            reap(Some(joined), &result).await;
        }

        let mut result = std::mem::take(&mut *result.lock().await);
        result.missing_students = self.roster.missing_students(
            &destination.course,
            result.students.iter().map(String::as_str),
        );
        Ok(result)
    }
}

/// Surface a worker that panicked instead of finishing its file.
async fn reap(
    joined: Option<Result<(), tokio::task::JoinError>>,
    result: &Mutex<SyncResult>,
) {
    if let Some(Err(e)) = joined {
        tracing::error!(error = %e, "sync worker stopped");
        result
            .lock()
            .await
            .feedback
            .push(Feedback::error(format!("sync worker stopped: {e}")));
    }
}

/// Create one folder per student, serially, before any worker starts.
fn create_student_dirs(
    submissions: &[Submission],
    destination: &Destination,
) -> Result<BTreeSet<String>, SyncError> {
    let mut students = BTreeSet::new();

    for submission in submissions {
        let student = normalize_name(submission.student());
        if students.contains(&student) {
            continue;
        }

        let dir = destination.student_dir(&student);
        fs::create_dir_all(&dir).map_err(|source| SyncError::Filesystem {
            path: dir.clone(),
            source,
        })?;
        students.insert(student);
    }

    Ok(students)
}

/// Pair every submission with the local path it is written to.
///
/// Two submissions of one student can map to the same filename, e.g. two
/// accounts sharing a display name or an upload named like an exported
/// document. The first of such a group, ordered by owner email then id,
/// keeps the plain name; the others get their file id in the name.
fn assign_targets(
    submissions: Vec<Submission>,
    destination: &Destination,
    feedback: &mut Vec<Feedback>,
) -> Vec<(Submission, PathBuf)> {
    let mut groups: HashMap<PathBuf, Vec<Submission>> = HashMap::new();
    for submission in submissions {
        let target = destination
            .student_dir(submission.student())
            .join(target_filename(&submission.file));
        groups.entry(target).or_default().push(submission);
    }

    let mut planned = Vec::new();
    for (target, mut group) in groups {
        group.sort_by(|a, b| {
            (&a.owner.email_address, &a.file.id).cmp(&(&b.owner.email_address, &b.file.id))
        });
        let mut group = group.into_iter();
        if let Some(first) = group.next() {
            planned.push((first, target.clone()));
        }
        for submission in group {
            let renamed = target.with_file_name(disambiguated_filename(&submission.file));
            tracing::warn!(
                path = %target.display(),
                renamed = %renamed.display(),
                "submissions share a filename"
            );
            feedback.push(Feedback::warning(format!(
                "{} of {} shares the name {}, saved as {}",
                submission.file.name,
                submission.owner.email_address,
                target.display(),
                renamed.display()
            )));
            planned.push((submission, renamed));
        }
    }
    planned
}

/// resolve -> transfer -> restore mtime -> collapse, for one file.
///
/// A failed transfer leaves the student folder as it was found.
async fn place_file(
    transfer: &dyn Transfer,
    submission: &Submission,
    target_path: PathBuf,
    offset: &FixedOffset,
) -> Result<PlacedFile, FileFailure> {
    let file = &submission.file;

    let placement =
        place_at(target_path.clone(), offset).map_err(|e| FileFailure::new(&target_path, e))?;
    let path = placement.target_path.as_path();
    tracing::debug!(path = %path.display(), "transferring");

    let transferred = match file.transfer_kind() {
        TransferKind::Download => transfer.download(&file.id, path).await,
        TransferKind::Export => transfer.export(&file.id, EXPORT_MIME, path).await,
    };
    if let Err(e) = transferred {
        if let Err(undo) = placement.roll_back() {
            tracing::warn!(path = %path.display(), error = %undo, "could not restore earlier copy");
            return Err(FileFailure::new(
                path,
                format!("{e}; earlier copy left at its history name: {undo}"),
            ));
        }
        return Err(FileFailure::new(path, e));
    }

    restore_modified_time(path, file.modified_time).map_err(|e| FileFailure::new(path, e))?;

    let collapsed = collapse_by_timestamp(path, placement.previous_copy.as_deref())
        .map_err(|e| FileFailure::new(path, e))?;

    Ok(PlacedFile {
        path: placement.target_path.clone(),
        collapsed,
        checksum: file.md5_checksum.clone(),
    })
}
