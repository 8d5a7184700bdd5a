//! Mirror of `.zip`/`.json` attachments from the backup channel to cloud
//! storage.
//!
//! Dedup is an in-memory set of attachment ids for the lifetime of the
//! process; a restart forgets it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, RosterError};

pub const SUPPORTED_EXTENSIONS: [&str; 2] = [".zip", ".json"];

/// Remote object store the mirror uploads into.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Upload the file at `path` as `name`; returns the remote object id.
    async fn upload(&self, path: &Path, name: &str, mime: &str) -> Result<String>;
}

/// The parts of a chat attachment the mirror uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub id: u64,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    AlreadySeen,
    Unsupported,
    Uploaded { name: String, file_id: String },
    Failed(String),
}

impl MirrorOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, MirrorOutcome::Uploaded { .. })
    }
}

pub fn is_supported(filename: &str) -> bool {
    SUPPORTED_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
}

/// `save.v2.zip` uploaded at 2025-03-04 05:06:07 becomes
/// `save_20250304050607.zip`: the base is everything before the first dot,
/// the extension everything after the last.
pub fn archive_name(filename: &str, now: DateTime<Utc>) -> String {
    let base = filename.split('.').next().unwrap_or(filename);
    let ext = filename.rsplit('.').next().unwrap_or("");
    format!("{base}_{}.{ext}", now.format("%Y%m%d%H%M%S"))
}

/// Attachments of an edited message that were not on its previous version.
/// Without a previous version every attachment is a candidate; dedup still
/// applies downstream.
pub fn new_attachments(
    previous: Option<&[AttachmentRef]>,
    current: Vec<AttachmentRef>,
) -> Vec<AttachmentRef> {
    match previous {
        None => current,
        Some(old) => current
            .into_iter()
            .filter(|a| !old.iter().any(|o| o.id == a.id))
            .collect(),
    }
}

pub fn confirmation(filename: &str) -> String {
    format!("✅ Uploaded **{filename}** to Drive.")
}

// ---------------------------------------------------------------------------
// Self-test report
// ---------------------------------------------------------------------------

pub const NO_CHANNEL_TEXT: &str = "DISCORD_CHANNEL_ID is not set.";
pub const CHANNEL_NOT_FOUND_TEXT: &str =
    "Channel not found by ID. The bot may not have access to it.";
pub const SELF_TEST_MESSAGE: &str = "🔎 Backup self-test: the bot can post here.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostResult {
    Ok,
    Skipped,
    Failed(String),
}

impl fmt::Display for PostResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostResult::Ok => f.write_str("ok"),
            PostResult::Skipped => f.write_str("skipped (no SendMessages)"),
            PostResult::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// What `/backup test` found about the watched channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCheck {
    pub channel_id: u64,
    /// `GuildText`, `PublicThread`, ... or `type=<n>`.
    pub kind: String,
    pub view_channel: bool,
    pub send_messages: bool,
    pub read_message_history: bool,
}

impl ChannelCheck {
    /// A test post is attempted only when the bot can see and write.
    pub fn can_post(&self) -> bool {
        self.view_channel && self.send_messages
    }

    pub fn report(&self, post: &PostResult) -> String {
        [
            format!("Target channel: `{}` ({})", self.channel_id, self.kind),
            format!(
                "Permissions: ViewChannel={} • SendMessages={} • ReadMessageHistory={}",
                self.view_channel, self.send_messages, self.read_message_history
            ),
            format!("Post test: {post}"),
            "Reminder: backups watch **only** this channel ID; posting in a thread requires setting the thread ID.".to_string(),
        ]
        .join("\n")
    }
}

// ---------------------------------------------------------------------------
// SeenAttachments
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SeenAttachments {
    ids: Mutex<HashSet<u64>>,
}

impl SeenAttachments {
    /// Record `id`; true only the first time it is seen.
    pub fn first_sighting(&self, id: u64) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// BackupMirror
// ---------------------------------------------------------------------------

pub struct BackupMirror<A> {
    archive: A,
    http: reqwest::Client,
    seen: SeenAttachments,
    work_dir: TempDir,
    delay: Duration,
}

impl<A: ArchiveStore> BackupMirror<A> {
    pub fn new(archive: A, delay: Duration) -> Result<Self> {
        Ok(Self {
            archive,
            http: reqwest::Client::new(),
            seen: SeenAttachments::default(),
            work_dir: tempfile::Builder::new().prefix("roster-backup").tempdir()?,
            delay,
        })
    }

    /// Debounce applied before a message's attachments are processed.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn seen(&self) -> &SeenAttachments {
        &self.seen
    }

    /// Download, upload and clean up one attachment. Never retries.
    pub async fn process(&self, attachment: &AttachmentRef) -> MirrorOutcome {
        if !self.seen.first_sighting(attachment.id) {
            tracing::info!(attachment = %attachment.filename, id = attachment.id, "already processed, skipping");
            return MirrorOutcome::AlreadySeen;
        }
        if !is_supported(&attachment.filename) {
            tracing::info!(attachment = %attachment.filename, "unsupported file type");
            return MirrorOutcome::Unsupported;
        }

        tracing::info!(attachment = %attachment.filename, "detected attachment");
        let path = self.temp_path(attachment);
        let outcome = match self.download(&attachment.url, &path).await {
            Ok(bytes) => {
                tracing::info!(attachment = %attachment.filename, bytes, "downloaded");
                self.upload(&path, &attachment.filename).await
            }
            Err(e) => {
                tracing::error!(attachment = %attachment.filename, error = %e, "download failed");
                MirrorOutcome::Failed(e.to_string())
            }
        };

        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "could not remove temp file");
            }
        }
        outcome
    }

    async fn upload(&self, path: &Path, filename: &str) -> MirrorOutcome {
        let name = archive_name(filename, Utc::now());
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        match self.archive.upload(path, &name, mime.essence_str()).await {
            Ok(file_id) => {
                tracing::info!(name = %name, file_id = %file_id, "uploaded to archive");
                MirrorOutcome::Uploaded { name, file_id }
            }
            Err(e) => {
                tracing::error!(name = %name, error = %e, "upload failed");
                MirrorOutcome::Failed(e.to_string())
            }
        }
    }

    fn temp_path(&self, attachment: &AttachmentRef) -> PathBuf {
        let ext = attachment.filename.rsplit('.').next().unwrap_or("bin");
        self.work_dir.path().join(format!("{}.{ext}", attachment.id))
    }

    /// Stream `url` into `path` chunk by chunk; returns bytes written.
    async fn download(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RosterError::Download(e.to_string()))?;

        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| RosterError::Download(e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct FakeArchive {
        uploads: Arc<Mutex<Vec<(String, String, Vec<u8>)>>>,
        fail: bool,
    }

    #[async_trait]
    impl ArchiveStore for FakeArchive {
        async fn upload(&self, path: &Path, name: &str, mime: &str) -> Result<String> {
            if self.fail {
                return Err(RosterError::Backend("quota exceeded".into()));
            }
            let bytes = tokio::fs::read(path).await?;
            self.uploads
                .lock()
                .unwrap()
                .push((name.to_string(), mime.to_string(), bytes));
            Ok("file-1".into())
        }
    }

    fn attachment(id: u64, filename: &str, url: String) -> AttachmentRef {
        AttachmentRef {
            id,
            filename: filename.into(),
            url,
        }
    }

    #[test]
    fn supported_extensions() {
        assert!(is_supported("guild.zip"));
        assert!(is_supported("bank.json"));
        assert!(!is_supported("notes.txt"));
        assert!(!is_supported("SAVE.ZIP"));
    }

    #[test]
    fn archive_name_uses_first_dot_base_and_last_extension() {
        let now = DateTime::parse_from_rfc3339("2025-03-04T05:06:07.890Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(archive_name("save.zip", now), "save_20250304050607.zip");
        assert_eq!(archive_name("save.v2.json", now), "save_20250304050607.json");
    }

    #[test]
    fn edited_message_yields_only_added_attachments() {
        let a = attachment(1, "a.zip", String::new());
        let b = attachment(2, "b.json", String::new());
        let fresh = new_attachments(Some(&[a.clone()]), vec![a.clone(), b.clone()]);
        assert_eq!(fresh, vec![b.clone()]);
        assert_eq!(new_attachments(None, vec![a.clone(), b]).len(), 2);
        assert!(new_attachments(Some(&[a.clone()]), vec![a]).is_empty());
    }

    #[test]
    fn seen_set_reports_first_sighting_once() {
        let seen = SeenAttachments::default();
        assert!(seen.first_sighting(5));
        assert!(!seen.first_sighting(5));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn self_test_report_lines() {
        let check = ChannelCheck {
            channel_id: 99,
            kind: "GuildText".into(),
            view_channel: true,
            send_messages: false,
            read_message_history: true,
        };
        assert!(!check.can_post());
        let report = check.report(&PostResult::Skipped);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Target channel: `99` (GuildText)");
        assert_eq!(
            lines[1],
            "Permissions: ViewChannel=true • SendMessages=false • ReadMessageHistory=true"
        );
        assert_eq!(lines[2], "Post test: skipped (no SendMessages)");
        assert!(lines[3].starts_with("Reminder:"));
        assert_eq!(PostResult::Failed("Missing Access".into()).to_string(), "failed: Missing Access");
    }

    #[tokio::test]
    async fn uploads_once_and_cleans_up() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/attachments/guild.zip")
            .with_status(200)
            .with_body("PK-bytes")
            .expect(1)
            .create_async()
            .await;

        let archive = FakeArchive::default();
        let mirror = BackupMirror::new(archive.clone(), Duration::ZERO).unwrap();
        let att = attachment(11, "guild.zip", format!("{}/attachments/guild.zip", server.url()));

        let first = mirror.process(&att).await;
        assert!(first.is_uploaded(), "{first:?}");
        assert_eq!(mirror.process(&att).await, MirrorOutcome::AlreadySeen);
        mock.assert_async().await;

        let uploads = archive.uploads.lock().unwrap().clone();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].0.starts_with("guild_") && uploads[0].0.ends_with(".zip"));
        assert_eq!(uploads[0].1, "application/zip");
        assert_eq!(uploads[0].2, b"PK-bytes");
        assert!(!mirror.temp_path(&att).exists());
    }

    #[tokio::test]
    async fn unsupported_is_marked_seen_without_download() {
        let mirror = BackupMirror::new(FakeArchive::default(), Duration::ZERO).unwrap();
        let att = attachment(3, "notes.txt", "http://127.0.0.1:1/never".into());
        assert_eq!(mirror.process(&att).await, MirrorOutcome::Unsupported);
        assert_eq!(mirror.process(&att).await, MirrorOutcome::AlreadySeen);
    }

    #[tokio::test]
    async fn upload_failure_is_reported_not_retried() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bank.json")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let archive = FakeArchive {
            fail: true,
            ..Default::default()
        };
        let mirror = BackupMirror::new(archive, Duration::ZERO).unwrap();
        let att = attachment(4, "bank.json", format!("{}/bank.json", server.url()));
        assert!(matches!(mirror.process(&att).await, MirrorOutcome::Failed(_)));
        assert!(!mirror.temp_path(&att).exists());
    }

    #[tokio::test]
    async fn download_error_status_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone.zip")
            .with_status(404)
            .create_async()
            .await;
        let mirror = BackupMirror::new(FakeArchive::default(), Duration::ZERO).unwrap();
        let att = attachment(6, "gone.zip", format!("{}/gone.zip", server.url()));
        assert!(matches!(mirror.process(&att).await, MirrorOutcome::Failed(_)));
    }
}
