//! Error types for the Chimera domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each side of a merge (reading sources, writing output) has its own error.

use thiserror::Error;

/// The top-level error type for all merge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Source errors ---
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    // --- Sink errors ---
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    // --- Request errors ---
    #[error("Invalid merge request: {0}")]
    InvalidRequest(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A source profile could not be located, read, or parsed.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    #[error("Profile '{id}' not found at {location}")]
    NotFound { id: String, location: String },

    #[error("Profile '{id}' is not a well-formed profile document: {reason}")]
    Parse { id: String, reason: String },

    #[error("Failed to read profile '{id}': {reason}")]
    Io { id: String, reason: String },

    #[error("'{id}' is not a usable profile identifier: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("Failed to list available profiles: {0}")]
    Listing(String),
}

impl ResolutionError {
    /// The profile identifier this error refers to, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::NotFound { id, .. }
            | Self::Parse { id, .. }
            | Self::Io { id, .. }
            | Self::InvalidId { id, .. } => Some(id),
            Self::Listing(_) => None,
        }
    }
}

/// A merged profile could not be persisted.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    #[error("Failed to serialize merged profile '{id}': {reason}")]
    Serialize { id: String, reason: String },

    #[error("Failed to write merged profile '{id}': {reason}")]
    Write { id: String, reason: String },
}
