use std::fmt;

use chrono::{DateTime, Utc};

use crate::sync::SyncError;

/// Remote-opaque identifier of a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A remote account, as reported on a file's sharing user or owner list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub display_name: String,
    pub email_address: String,
}

impl Person {
    pub fn new(display_name: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email_address: email_address.into(),
        }
    }
}

/// How a file's content is brought to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Binary upload, fetched byte for byte under its original filename.
    Download,
    /// Native document with no original filename, exported to PDF.
    Export,
}

/// Metadata for one file in an assignment's submission folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: FileId,
    /// Filename the student uploaded. Absent for native documents.
    pub original_filename: Option<String>,
    /// Title of the file. Always present.
    pub name: String,
    pub sharing_user: Option<Person>,
    pub owners: Vec<Person>,
    pub modified_time: DateTime<Utc>,
    pub mime_type: String,
    /// Content checksum. Only binary files carry one.
    pub md5_checksum: Option<String>,
}

impl RemoteFile {
    /// Resolve which student submitted this file.
    ///
    /// The sharing user wins. A file without one falls back to the first
    /// listed owner. A file with neither cannot be placed.
    pub fn owner(&self) -> Result<&Person, SyncError> {
        if let Some(user) = &self.sharing_user {
            return Ok(user);
        }

        self.owners
            .first()
            .ok_or_else(|| SyncError::ContractViolation(self.id.clone()))
    }

    pub fn transfer_kind(&self) -> TransferKind {
        if self.original_filename.is_some() {
            TransferKind::Download
        } else {
            TransferKind::Export
        }
    }

    /// Last dot-delimited segment of the mime type.
    /// `application/vnd.google-apps.document` -> `document`
    pub fn mime_suffix(&self) -> &str {
        self.mime_type
            .rsplit('.')
            .next()
            .unwrap_or(&self.mime_type)
    }
}

/// A remote file whose owner has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub owner: Person,
    pub file: RemoteFile,
}

impl Submission {
    /// Display name of the submitting student, used as the folder name.
    pub fn student(&self) -> &str {
        &self.owner.display_name
    }
}
