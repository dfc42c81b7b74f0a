//! Error types for the sync module.

use stackmirror_core::StackSnapshot;
use thiserror::Error;

/// Errors that can occur while queueing snapshots.
///
/// Both hand the rejected snapshot back so the producer can decide what to
/// do with it. Failures while mirroring are reported per resource in
/// [`ResourceOutcome`](crate::ResourceOutcome), never as errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The queue is at capacity (non-waiting enqueue only).
    #[error("mapping queue is full, snapshot for stack {} rejected", .0.stack_id)]
    QueueFull(Box<StackSnapshot>),

    /// The worker side of the queue is gone.
    #[error("mapping queue is closed, snapshot for stack {} rejected", .0.stack_id)]
    QueueClosed(Box<StackSnapshot>),
}

impl SyncError {
    /// The rejected snapshot.
    pub fn into_snapshot(self) -> StackSnapshot {
        match self {
            Self::QueueFull(snapshot) | Self::QueueClosed(snapshot) => *snapshot,
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
