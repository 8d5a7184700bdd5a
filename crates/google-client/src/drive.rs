use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use crate::auth::TokenSource;
use crate::error::Result;
use crate::types::DriveFile;

pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com";

const BOUNDARY: &str = "roster_upload_boundary_5c1e9a";

#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<dyn TokenSource>,
}

impl DriveClient {
    pub fn new(auth: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DRIVE_BASE_URL.to_string(),
            auth,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Upload the file at `path` into `folder_id` as `name`; returns the new
    /// file id.
    pub async fn upload(
        &self,
        path: &Path,
        name: &str,
        mime: &str,
        folder_id: &str,
    ) -> Result<String> {
        let content = tokio::fs::read(path).await?;
        let metadata = json!({ "name": name, "parents": [folder_id] });
        let body = multipart_related(&metadata, mime, &content)?;

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(format!(
                "{}/upload/drive/v3/files",
                self.base_url.trim_end_matches('/')
            ))
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={BOUNDARY}"),
            )
            .body(body)
            .send()
            .await?;
        let file: DriveFile = crate::check(response).await?.json().await?;
        tracing::debug!(name, file_id = %file.id, bytes = content.len(), "drive upload complete");
        Ok(file.id)
    }
}

/// JSON metadata part followed by the media part.
fn multipart_related(metadata: &serde_json::Value, mime: &str, content: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(&serde_json::to_vec(metadata)?);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\nContent-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Ok(body)
}
