//! `google-client` — the slice of the Google Sheets v4 and Drive v3 REST
//! APIs the roster bot needs, authenticated as a service account.
//!
//! # Architecture
//!
//! ```text
//! ServiceAccount  ← signs an RS256 JWT, exchanges it at the OAuth token
//!     │              endpoint, caches the bearer token until near expiry
//!     ▼
//! TokenSource (Arc<dyn>)
//!     │
//!     ├──▶ SheetsClient  ← values get/update/append/clear/batchUpdate,
//!     │                    grid data with notes, updateCells, addSheet
//!     └──▶ DriveClient   ← multipart/related upload into a folder
//! ```
//!
//! Every base URL is overridable so tests can point the clients at a local
//! mock server.

pub mod auth;
pub mod drive;
pub mod error;
pub mod sheets;
pub mod types;

pub use auth::{ServiceAccount, StaticToken, TokenSource, SCOPES};
pub use drive::DriveClient;
pub use error::{GoogleError, Result};
pub use sheets::SheetsClient;
pub use types::{GridCell, ValueInputOption};

/// Turn a non-2xx response into [`GoogleError::Status`] with Google's error
/// message when the body carries one.
pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<types::ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(GoogleError::Status {
        status: status.as_u16(),
        message,
    })
}
