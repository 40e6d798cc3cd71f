//! Error types for subsync-gateway.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from remote platform access.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No valid credential available (missing/expired token, HTTP 401).
    #[error("authorization required: {0}")]
    AuthRequired(String),

    /// The referenced video or caption track does not exist remotely.
    #[error("remote resource not found: {what}")]
    RemoteNotFound { what: String },

    /// The credential lacks rights on this channel (HTTP 403).
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// The platform rejected the call because the daily quota is exhausted.
    #[error("daily API quota exceeded")]
    QuotaExceeded,

    /// Transport-level failure — safe to suggest a re-run.
    #[error("network error: {0}")]
    Network(String),

    /// Any other HTTP error status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The platform answered with a body we could not interpret.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Local I/O error (reading a subtitle file for upload, cache writes).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GatewayError {
    /// Whether a re-run is likely to succeed without any other change.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Network(_))
    }
}

/// Convenience constructor for [`GatewayError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GatewayError {
    GatewayError::Io {
        path: path.into(),
        source,
    }
}
