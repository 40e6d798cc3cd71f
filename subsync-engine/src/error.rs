//! Error types for subsync-engine.

use std::path::PathBuf;

use thiserror::Error;

use subsync_core::types::ChannelId;
use subsync_core::ManifestError;
use subsync_gateway::GatewayError;

/// Setup-level errors that abort a sync run before any plan executes.
///
/// Per-action failures are *not* errors — they are captured into the
/// action's outcome in the [`crate::SyncReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the manifest store.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A gateway error during setup (project creation, channel listing).
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The project's manifest belongs to a different channel.
    #[error("project belongs to channel {manifest}, not {requested}")]
    ChannelMismatch {
        manifest: ChannelId,
        requested: ChannelId,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
