use crate::pbxproj::AnchorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("anchor missing: {0}")]
    AnchorMissing(AnchorKind),

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("identifier collision: {0} already exists in the project")]
    IdentifierCollision(String),

    #[error("ambiguous target '{target}': {reason}")]
    AmbiguousTarget { target: String, reason: String },

    #[error("edit would break project consistency: {0}")]
    BrokenInvariant(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl OpsError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        OpsError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn ambiguous(target: &str, reason: impl Into<String>) -> Self {
        OpsError::AmbiguousTarget {
            target: target.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpsError>;
