//! Error types for raceteam.

use thiserror::Error;

use crate::store::DocKey;

/// Errors that can occur in raceteam operations.
#[derive(Error, Debug)]
pub enum TeamError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Remote store unreachable for '{key}', using local snapshot: {reason}")]
    SyncDegraded { key: DocKey, reason: String },

    #[error("Changes to '{key}' were saved locally but could not be synchronized: {reason}")]
    SyncLost { key: DocKey, reason: String },

    #[error("Refresh failed: {0}")]
    Refresh(String),

    #[error("A refresh is already in progress")]
    RefreshInProgress,

    #[error("Team data has not been loaded yet")]
    NotReady,

    #[error("Identity error: {0}")]
    Identity(#[from] crate::identity::IdentityError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for raceteam operations.
pub type TeamResult<T> = Result<T, TeamError>;
