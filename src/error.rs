//! Error types for the tidepool access layer

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by repositories, clients and account accessors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("The item `{key}` could not be found. Container: {container}")]
    NotFound { key: String, container: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("The expected local file `{}` is not here", .0.display())]
    LocalFileMissing(PathBuf),

    #[error("No key accessor registered for type `{0}`")]
    UnregisteredType(&'static str),

    #[error("Tag property `{0}` is missing or not a string")]
    MissingTag(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether this error is a missing-object outcome rather than a failure
    /// of the operation itself.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
