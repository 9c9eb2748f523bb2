//! Error types for stylesnap-client
//!
//! Transport failures are [`CatalogApiError`]. The pipeline and the
//! synchronizer wrap them in their own taxonomy so callers can tell a
//! retryable commit failure from a terminal inference failure.

use stylesnap_common::events::DraftPhase;
use thiserror::Error;

/// Catalog service HTTP errors
#[derive(Debug, Error)]
pub enum CatalogApiError {
    /// Transport-level failure (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Service answered with a non-success status
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Service answered 2xx but the body was not what the contract says
    #[error("Parse error: {0}")]
    Parse(String),

    /// Service answered 2xx with an `{"error": ...}` object
    #[error("Server reported error: {0}")]
    Server(String),

    /// Request could not be built from the given input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CatalogApiError {
    /// HTTP status, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Device capability the user declined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Camera,
    Library,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Camera => f.write_str("camera"),
            Capability::Library => f.write_str("photo library"),
        }
    }
}

/// Capture-to-catalog pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// User declined a device permission; re-promptable
    #[error("Permission denied: {0} access was not granted")]
    PermissionDenied(Capability),

    /// User backed out of the camera or picker
    #[error("Capture cancelled")]
    CaptureCancelled,

    /// Upload or classification failed; the draft was discarded
    #[error("Inference failed: {0}")]
    InferenceFailed(#[source] CatalogApiError),

    /// Metadata update failed; edits are kept and commit may be retried
    #[error("Commit failed: {0}")]
    CommitFailed(#[source] CatalogApiError),

    /// Commit attempted on a draft the server never identified
    #[error("Draft has no server reference; cannot commit")]
    MissingServerReference,

    /// Operation not permitted in the current phase
    #[error("{operation} is not permitted while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: DraftPhase,
    },
}

/// Wardrobe synchronizer errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// Catalog fetch failed; the previous view is still in place
    #[error("Fetch failed: {0}")]
    FetchFailed(#[source] CatalogApiError),

    /// Delete rejected; the item is still in the view
    #[error("Delete failed: {0}")]
    DeleteFailed(#[source] CatalogApiError),

    /// A later fetch was applied first; this response was dropped
    #[error("Fetch #{sequence} superseded by a newer fetch")]
    Superseded { sequence: u64 },
}

/// Recommendation lookup errors
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Recommendation request failed: {0}")]
    Api(#[from] CatalogApiError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
pub type SyncResult<T> = Result<T, SyncError>;
