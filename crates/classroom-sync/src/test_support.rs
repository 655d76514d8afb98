use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{FileId, ListingError, Person, RemoteFile, RemoteListing, Transfer, TransferError};

/// A binary upload shared by `student`.
pub fn binary_file(
    id: &str,
    student: &str,
    filename: &str,
    modified_time: DateTime<Utc>,
) -> RemoteFile {
    RemoteFile {
        id: FileId::new(id),
        original_filename: Some(filename.to_owned()),
        name: filename.to_owned(),
        sharing_user: Some(person(student)),
        owners: vec![],
        modified_time,
        mime_type: "application/octet-stream".into(),
        md5_checksum: None,
    }
}

/// A native document owned by `student`, exported on sync.
pub fn native_document(
    id: &str,
    student: &str,
    title: &str,
    mime_type: &str,
    modified_time: DateTime<Utc>,
) -> RemoteFile {
    RemoteFile {
        id: FileId::new(id),
        original_filename: None,
        name: title.to_owned(),
        sharing_user: None,
        owners: vec![person(student)],
        modified_time,
        mime_type: mime_type.to_owned(),
        md5_checksum: None,
    }
}

/// `Ann Berg` -> `ann.berg@school.test`
fn person(display_name: &str) -> Person {
    let email = format!(
        "{}@school.test",
        display_name.to_lowercase().replace(' ', ".")
    );
    Person::new(display_name, email)
}

/// In-memory transfer for testing. Serves fixed bytes per file id.
///
/// Every transfer holds its slot for a couple of milliseconds so concurrent
/// callers overlap; `max_in_flight` records the widest overlap seen.
#[derive(Default)]
pub struct FakeDrive {
    contents: HashMap<FileId, Vec<u8>>,
    failing: HashSet<FileId>,
    downloads: AtomicUsize,
    exports: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, id: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.contents.insert(FileId::new(id), bytes.into());
        self
    }

    /// Make every transfer of `id` fail with a network error.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(FileId::new(id));
        self
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn exports(&self) -> usize {
        self.exports.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn serve(&self, id: &FileId, dest: &Path) -> Result<(), TransferError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        let served = self.write(id, dest).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        served
    }

    async fn write(&self, id: &FileId, dest: &Path) -> Result<(), TransferError> {
        if self.failing.contains(id) {
            return Err(TransferError::Network(format!("connection reset fetching {id}")));
        }
        let bytes = self.contents.get(id).ok_or(TransferError::Status(404))?;
        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transfer for FakeDrive {
    async fn download(&self, id: &FileId, dest: &Path) -> Result<(), TransferError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.serve(id, dest).await
    }

    async fn export(
        &self,
        id: &FileId,
        _target_mime: &str,
        dest: &Path,
    ) -> Result<(), TransferError> {
        self.exports.fetch_add(1, Ordering::SeqCst);
        self.serve(id, dest).await
    }
}

/// In-memory listing for testing, keyed by folder id.
pub struct InMemoryListing {
    label: String,
    folders: HashMap<String, Vec<RemoteFile>>,
}

impl InMemoryListing {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            folders: HashMap::new(),
        }
    }

    pub fn add(&mut self, folder_id: &str, file: RemoteFile) {
        self.folders
            .entry(folder_id.to_owned())
            .or_default()
            .push(file);
    }
}

#[async_trait::async_trait]
impl RemoteListing for InMemoryListing {
    fn label(&self) -> &str {
        &self.label
    }

    async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ListingError> {
        self.folders
            .get(folder_id)
            .cloned()
            .ok_or_else(|| ListingError::Other(format!("no such folder: {folder_id}")))
    }
}
