use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("no roster row found for this member")]
    NoRow,

    #[error("Class \"{0}\" is not recognized.")]
    UnknownClass(String),

    #[error("You need the **Officer** role to run this command.")]
    MissingOfficerRole,

    #[error("Missing config: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("invalid config value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("Sheet \"{0}\" not found")]
    SheetNotFound(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RosterError {
    /// True for errors caused by the invoking member rather than a backend.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RosterError::NoRow | RosterError::UnknownClass(_) | RosterError::MissingOfficerRole
        )
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
