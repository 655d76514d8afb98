use std::path::Path;

use classroom_sync::{FileId, ListingError, RemoteFile, RemoteListing, Transfer, TransferError};

use crate::types::{FILE_FIELDS, FileList};

/// Configuration for a Drive client.
#[derive(Debug, Clone, Default)]
pub struct DriveClientConfig {
    /// OAuth bearer token. Obtaining one is the caller's business.
    pub token: Option<String>,
    pub api_base_url: Option<String>,
}

/// Lists submission folders and transfers files over the Drive v3 REST API.
pub struct DriveClient {
    config: DriveClientConfig,
    client: reqwest::Client,
}

impl DriveClient {
    pub fn new(config: DriveClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_base(&self) -> &str {
        self.config
            .api_base_url
            .as_deref()
            .unwrap_or("https://www.googleapis.com")
    }

    fn build_request(&self, url: reqwest::Url) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url).header("User-Agent", "classroom-sync");

        if let Some(token) = &self.config.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        req
    }

    fn files_url(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<reqwest::Url, ListingError> {
        let query = format!("'{folder_id}' in parents");
        let mut params = vec![("q", query.as_str()), ("fields", FILE_FIELDS)];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        reqwest::Url::parse_with_params(&format!("{}/drive/v3/files", self.api_base()), &params)
            .map_err(|e| ListingError::Other(format!("invalid listing URL: {e}")))
    }

    fn content_url(
        &self,
        id: &FileId,
        export_mime: Option<&str>,
    ) -> Result<reqwest::Url, TransferError> {
        let parsed = match export_mime {
            Some(mime) => reqwest::Url::parse_with_params(
                &format!("{}/drive/v3/files/{id}/export", self.api_base()),
                &[("mimeType", mime)],
            ),
            None => reqwest::Url::parse_with_params(
                &format!("{}/drive/v3/files/{id}", self.api_base()),
                &[("alt", "media")],
            ),
        };
        parsed.map_err(|e| TransferError::Network(format!("invalid transfer URL: {e}")))
    }

    async fn fetch_page(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<FileList, ListingError> {
        let url = self.files_url(folder_id, page_token)?;

        let response = self
            .build_request(url)
            .send()
            .await
            .map_err(|e| ListingError::Network(format!("files.list request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ListingError::Network(format!(
                "files.list returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ListingError::Parse(format!("invalid files.list response: {e}")))
    }

    /// GET `url` and write the body to `dest`.
    async fn save(&self, url: reqwest::Url, dest: &Path) -> Result<(), TransferError> {
        let response = self
            .build_request(url)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransferError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransferError::Network(format!("failed to read body: {e}")))?;

        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteListing for DriveClient {
    fn label(&self) -> &str {
        "drive"
    }

    async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, ListingError> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(folder_id, page_token.as_deref()).await?;
            tracing::debug!(folder_id, count = page.files.len(), "listed page");
            files.extend(page.files.into_iter().map(RemoteFile::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }
}

#[async_trait::async_trait]
impl Transfer for DriveClient {
    async fn download(&self, id: &FileId, dest: &Path) -> Result<(), TransferError> {
        let url = self.content_url(id, None)?;
        self.save(url, dest).await
    }

    async fn export(
        &self,
        id: &FileId,
        target_mime: &str,
        dest: &Path,
    ) -> Result<(), TransferError> {
        let url = self.content_url(id, Some(target_mime))?;
        self.save(url, dest).await
    }
}
