//! Google-backed implementations of the roster-core storage traits.

pub mod drive;
pub mod sheets;

use google_client::GoogleError;
use roster_core::RosterError;

pub(crate) fn backend_error(err: GoogleError) -> RosterError {
    match err {
        GoogleError::SheetNotFound(title) => RosterError::SheetNotFound(title),
        other => RosterError::Backend(other.to_string()),
    }
}
