//! Collapses stale revisions in a remote listing.
//!
//! The listing API occasionally returns several entries for one logical file
//! (same owner, same title). Only the most recently modified one is kept.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::feedback::Feedback;
use crate::file::{FileId, RemoteFile, Submission};

/// Sort key ordering a listing by owner, then title, newest revision first.
/// The file id breaks remaining ties so the order is total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RevisionKey {
    owner_email: String,
    logical_name: String,
    newest_first: Reverse<DateTime<Utc>>,
    id: FileId,
}

impl RevisionKey {
    fn new(submission: &Submission) -> Self {
        Self {
            owner_email: submission.owner.email_address.clone(),
            logical_name: submission.file.name.clone(),
            newest_first: Reverse(submission.file.modified_time),
            id: submission.file.id.clone(),
        }
    }

    fn same_logical_file(&self, other: &Self) -> bool {
        self.owner_email == other.owner_email && self.logical_name == other.logical_name
    }
}

/// Output of [`dedupe`].
#[derive(Debug, Default)]
pub struct Deduplicated {
    /// At most one submission per (owner email, title), ordered by owner then title.
    pub submissions: Vec<Submission>,
    /// Number of stale revisions that were dropped.
    pub ignored: u64,
    pub feedback: Vec<Feedback>,
}

/// Keep the latest revision of every (owner, title) pair.
///
/// Files with no resolvable owner are skipped and reported as errors.
/// The result does not depend on the order of `files`.
pub fn dedupe(files: Vec<RemoteFile>) -> Deduplicated {
    let mut out = Deduplicated::default();
    let mut keyed = Vec::with_capacity(files.len());

    for file in files {
        let owner = match file.owner() {
            Ok(owner) => owner.clone(),
            Err(e) => {
                tracing::warn!(file_id = %file.id, "skipping file without owner");
                out.feedback
                    .push(Feedback::error(format!("skipping {}: {e}", file.name)));
                continue;
            }
        };
        let submission = Submission { owner, file };
        keyed.push((RevisionKey::new(&submission), submission));
    }

    keyed.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let mut kept: Option<RevisionKey> = None;
    for (key, submission) in keyed {
        if kept.as_ref().is_some_and(|k| k.same_logical_file(&key)) {
            let msg = format!(
                "ignored duplicate: {}::{}::{}",
                key.owner_email,
                key.logical_name,
                submission.file.modified_time.to_rfc3339()
            );
            tracing::info!("{msg}");
            out.feedback.push(Feedback::info(msg));
            out.ignored += 1;
            continue;
        }
        kept = Some(key);
        out.submissions.push(submission);
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::file::Person;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 10, 28, hour, 0, 0).unwrap()
    }

    fn file(id: &str, email: &str, name: &str, modified: DateTime<Utc>) -> RemoteFile {
        RemoteFile {
            id: FileId::new(id),
            original_filename: Some(name.to_owned()),
            name: name.to_owned(),
            sharing_user: Some(Person::new(email.split('@').next().unwrap_or(email), email)),
            owners: vec![],
            modified_time: modified,
            mime_type: "application/octet-stream".into(),
            md5_checksum: None,
        }
    }

    fn ids(d: &Deduplicated) -> Vec<&str> {
        d.submissions.iter().map(|s| s.file.id.as_str()).collect()
    }

    #[test]
    fn keeps_latest_revision() {
        let out = dedupe(vec![
            file("old", "a@x.com", "Essay.docx", at(9)),
            file("new", "a@x.com", "Essay.docx", at(10)),
        ]);
        assert_eq!(ids(&out), vec!["new"]);
        assert_eq!(out.ignored, 1);
    }

    #[test]
    fn logs_ignored_duplicate() {
        let out = dedupe(vec![
            file("old", "a@x.com", "Essay.docx", at(9)),
            file("new", "a@x.com", "Essay.docx", at(10)),
        ]);
        assert_eq!(
            out.feedback,
            vec![Feedback::info(
                "ignored duplicate: a@x.com::Essay.docx::2019-10-28T09:00:00+00:00"
            )]
        );
    }

    #[test]
    fn same_title_different_owners_both_kept() {
        let out = dedupe(vec![
            file("b", "b@x.com", "Essay.docx", at(9)),
            file("a", "a@x.com", "Essay.docx", at(9)),
        ]);
        assert_eq!(ids(&out), vec!["a", "b"]);
        assert_eq!(out.ignored, 0);
    }

    #[test]
    fn result_independent_of_input_order() {
        let files = vec![
            file("1", "a@x.com", "Essay.docx", at(9)),
            file("2", "a@x.com", "Essay.docx", at(11)),
            file("3", "a@x.com", "Essay.docx", at(10)),
            file("4", "b@x.com", "Lab.pdf", at(8)),
            file("5", "b@x.com", "Lab.pdf", at(8)),
            file("6", "a@x.com", "Notes.txt", at(12)),
        ];
        let expected = ids(&dedupe(files.clone()))
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        let mut reversed = files.clone();
        reversed.reverse();
        let mut rotated = files;
        rotated.rotate_left(2);

        for permutation in [reversed, rotated] {
            let got = dedupe(permutation);
            assert_eq!(ids(&got), expected);
        }
    }

    #[test]
    fn equal_timestamps_tie_break_on_id() {
        let out = dedupe(vec![
            file("z", "b@x.com", "Lab.pdf", at(8)),
            file("m", "b@x.com", "Lab.pdf", at(8)),
        ]);
        assert_eq!(ids(&out), vec!["m"]);
    }

    #[test]
    fn file_without_identity_is_skipped_with_error() {
        let mut orphan = file("orphan", "a@x.com", "Ghost.txt", at(9));
        orphan.sharing_user = None;

        let out = dedupe(vec![orphan, file("ok", "a@x.com", "Essay.docx", at(9))]);
        assert_eq!(ids(&out), vec!["ok"]);
        assert_eq!(out.feedback.len(), 1);
        assert!(out.feedback[0].is_error());
    }

    #[test]
    fn empty_listing() {
        let out = dedupe(vec![]);
        assert!(out.submissions.is_empty());
        assert!(out.feedback.is_empty());
    }
}
