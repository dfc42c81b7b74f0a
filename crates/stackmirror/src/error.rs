//! Error types for StackMirror.

use stackmirror_store::StoreError;
use stackmirror_sync::SyncError;
use thiserror::Error;

/// Errors that can occur during Mirror operations.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Queue or worker error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// The worker was already started for this mirror.
    #[error("worker already started")]
    AlreadyStarted,

    /// The worker task panicked or was aborted.
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type for Mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
