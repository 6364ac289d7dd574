//! Error types for Rinth

use thiserror::Error;

/// Result type alias for Rinth operations
pub type RinthResult<T> = Result<T, RinthError>;

/// Main error type for Rinth
#[derive(Error, Debug)]
pub enum RinthError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Remote fetch failed for {what}: {detail}")]
    RemoteFetch { what: String, detail: String },

    #[error("No usable file in version {version} of {project}")]
    NoPrimaryFile { project: String, version: String },

    #[error("Invalid game version: {0}")]
    InvalidGameVersion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Download of {url} failed verification: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("User input error: {0}")]
    Dialoguer(String),

    #[error("{0}")]
    Other(String),
}

impl From<dialoguer::Error> for RinthError {
    fn from(err: dialoguer::Error) -> Self {
        RinthError::Dialoguer(err.to_string())
    }
}

impl RinthError {
    /// Create a generic error from a string
    pub fn other<S: Into<String>>(msg: S) -> Self {
        RinthError::Other(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        RinthError::Config(msg.into())
    }

    /// Create an index error
    pub fn index<S: Into<String>>(msg: S) -> Self {
        RinthError::Index(msg.into())
    }

    /// Create a remote fetch error
    pub fn remote_fetch<W: Into<String>, D: Into<String>>(what: W, detail: D) -> Self {
        RinthError::RemoteFetch {
            what: what.into(),
            detail: detail.into(),
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RinthError::CollectionNotFound(_) => 2,
            RinthError::ProjectNotFound(_) => 2,
            RinthError::ChecksumMismatch { .. } => 3,
            RinthError::Config(_) => 5,
            RinthError::UserCancelled => 130,
            _ => 1,
        }
    }
}
