use async_trait::async_trait;
use google_client::DriveClient;
use roster_core::backup::ArchiveStore;
use std::path::Path;

use super::backend_error;

/// Uploads mirrored attachments into one Drive folder.
pub struct DriveArchive {
    drive: DriveClient,
    folder_id: String,
}

impl DriveArchive {
    pub fn new(drive: DriveClient, folder_id: impl Into<String>) -> Self {
        Self {
            drive,
            folder_id: folder_id.into(),
        }
    }
}

#[async_trait]
impl ArchiveStore for DriveArchive {
    async fn upload(&self, path: &Path, name: &str, mime: &str) -> roster_core::Result<String> {
        self.drive
            .upload(path, name, mime, &self.folder_id)
            .await
            .map_err(backend_error)
    }
}
