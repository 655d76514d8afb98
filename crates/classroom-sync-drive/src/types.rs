//! Wire types for the Drive v3 `files` resource.

use chrono::{DateTime, Utc};
use classroom_sync::{FileId, Person, RemoteFile};
use serde::Deserialize;

/// Fields requested on every listing page.
pub const FILE_FIELDS: &str = "files(id,name,originalFilename,sharingUser(displayName,emailAddress),owners(displayName,emailAddress),mimeType,md5Checksum,modifiedTime),nextPageToken";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub original_filename: Option<String>,
    pub sharing_user: Option<DriveUser>,
    #[serde(default)]
    pub owners: Vec<DriveUser>,
    pub mime_type: String,
    pub md5_checksum: Option<String>,
    pub modified_time: DateTime<Utc>,
}

/// One page of `files.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

impl From<DriveUser> for Person {
    fn from(user: DriveUser) -> Self {
        Person::new(user.display_name, user.email_address)
    }
}

impl From<DriveFile> for RemoteFile {
    fn from(file: DriveFile) -> Self {
        RemoteFile {
            id: FileId::new(file.id),
            original_filename: file.original_filename,
            name: file.name,
            sharing_user: file.sharing_user.map(Person::from),
            owners: file.owners.into_iter().map(Person::from).collect(),
            modified_time: file.modified_time,
            mime_type: file.mime_type,
            md5_checksum: file.md5_checksum,
        }
    }
}

#[cfg(test)]
mod tests {
    use classroom_sync::TransferKind;

    use super::*;

    #[test]
    fn converts_binary_file() {
        let json = r#"{
            "id": "1a",
            "name": "lab1.py",
            "originalFilename": "lab1.py",
            "sharingUser": {"displayName": "Ann Berg", "emailAddress": "ann@school.test"},
            "owners": [{"displayName": "Teacher", "emailAddress": "t@school.test"}],
            "mimeType": "text/x-python",
            "md5Checksum": "d41d8cd98f00b204e9800998ecf8427e",
            "modifiedTime": "2019-04-24T11:12:29.000Z"
        }"#;
        let file: RemoteFile = serde_json::from_str::<DriveFile>(json).unwrap().into();

        assert_eq!(file.id.as_str(), "1a");
        assert_eq!(file.transfer_kind(), TransferKind::Download);
        assert_eq!(file.owner().unwrap().display_name, "Ann Berg");
        assert_eq!(file.modified_time.to_rfc3339(), "2019-04-24T11:12:29+00:00");
        assert!(file.md5_checksum.is_some());
    }

    #[test]
    fn converts_native_document_without_sharing_user() {
        let json = r#"{
            "id": "2b",
            "name": "Essay",
            "owners": [{"displayName": "Bo Ek", "emailAddress": "bo@school.test"}],
            "mimeType": "application/vnd.google-apps.document",
            "modifiedTime": "2019-04-24T11:12:29Z"
        }"#;
        let file: RemoteFile = serde_json::from_str::<DriveFile>(json).unwrap().into();

        assert_eq!(file.transfer_kind(), TransferKind::Export);
        assert_eq!(file.owner().unwrap().email_address, "bo@school.test");
        assert_eq!(file.md5_checksum, None);
    }

    #[test]
    fn empty_page_has_no_files() {
        let page: FileList = serde_json::from_str("{}").unwrap();
        assert!(page.files.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
