use std::fmt::Write;

use classroom_sync::{Feedback, Submission, SyncResult, TransferKind};

const MAX_NAME_WIDTH: usize = 40;

/// Print feedback items to stderr.
pub fn print_feedback(feedback: &[Feedback]) {
    for item in feedback {
        eprintln!("{item}");
    }
}

/// End-of-run report: totals, changed files, failures, students without
/// submissions and files sharing a checksum.
pub fn sync_summary(result: &SyncResult) -> String {
    let mut out = String::new();

    let _ = write!(out, "\nDownloaded {} file(s).", result.total_processed);
    if result.new_or_changed.is_empty() {
        out.push('\n');
    } else {
        let _ = writeln!(
            out,
            " {} file(s) appear to be modified since last sync:",
            result.new_or_changed.len()
        );
        for path in &result.new_or_changed {
            let _ = writeln!(out, "{}", path.display());
        }
    }

    if !result.failures.is_empty() {
        let _ = writeln!(out, "\nThere was an error transferring the following file(s):");
        for failure in &result.failures {
            let _ = writeln!(out, "{}", failure.path.display());
            let _ = writeln!(out, "Reason: {}", failure.cause);
        }
        let _ = writeln!(out, "You might want to try syncing this assignment again.");
    }

    if !result.missing_students.is_empty() {
        let _ = writeln!(out, "\nMissing assignments from the following student(s):");
        for student in &result.missing_students {
            let _ = writeln!(out, "{student}");
        }
    }

    let mut collisions = result.checksum_collisions().peekable();
    if collisions.peek().is_some() {
        let _ = writeln!(out, "\nThe following files have matching md5-checksums:");
        for (checksum, paths) in collisions {
            for path in paths {
                let _ = writeln!(out, "{checksum}\t{}", path.display());
            }
        }
    }

    out
}

/// One line per submission: student, file, modified time, transfer kind.
pub fn listing_table(submissions: &[Submission]) -> String {
    let width = submissions
        .iter()
        .map(|s| s.student().chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    let mut out = String::new();
    for submission in submissions {
        let file = &submission.file;
        let kind = match file.transfer_kind() {
            TransferKind::Download => "download",
            TransferKind::Export => "export",
        };
        let _ = writeln!(
            out,
            "{:<width$}  {}  {:<8}  {}",
            truncate(submission.student(), width),
            file.modified_time.format("%Y-%m-%d %H:%M:%S"),
            kind,
            file.original_filename.as_deref().unwrap_or(&file.name),
        );
    }
    let _ = writeln!(out, "\n{} file(s)", submissions.len());
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{truncated}...")
    }
}
