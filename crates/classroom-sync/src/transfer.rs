use std::path::Path;
use std::sync::Arc;

use crate::file::{FileId, RemoteFile};

/// Errors that can occur while listing an assignment folder.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

/// Errors that can occur while bringing one file's content to disk.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("network error: {0}")]
    Network(String),

    #[error("remote returned HTTP {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lists the files in a remote submission folder.
#[async_trait::async_trait]
pub trait RemoteListing: Send + Sync {
    /// Human-readable label identifying the remote.
    fn label(&self) -> &str;

    /// List every file in the folder. Pagination is the implementation's
    /// concern; callers always receive the full listing.
    async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ListingError>;
}

/// Writes a remote file's content to a local path.
#[async_trait::async_trait]
pub trait Transfer: Send + Sync {
    /// Fetch a binary file verbatim.
    async fn download(&self, id: &FileId, dest: &Path) -> Result<(), TransferError>;

    /// Export a native document to `target_mime`.
    async fn export(&self, id: &FileId, target_mime: &str, dest: &Path)
    -> Result<(), TransferError>;
}

#[async_trait::async_trait]
impl<T: RemoteListing + ?Sized> RemoteListing for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ListingError> {
        (**self).list_files(folder_id).await
    }
}

#[async_trait::async_trait]
impl<T: Transfer + ?Sized> Transfer for Arc<T> {
    async fn download(&self, id: &FileId, dest: &Path) -> Result<(), TransferError> {
        (**self).download(id, dest).await
    }

    async fn export(
        &self,
        id: &FileId,
        target_mime: &str,
        dest: &Path,
    ) -> Result<(), TransferError> {
        (**self).export(id, target_mime, dest).await
    }
}
