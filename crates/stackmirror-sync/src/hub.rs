//! The snapshot queue between stack watchers and the worker.
//!
//! Bounded FIFO, many producers, one consumer. `enqueue` waits for room
//! instead of dropping, so a full queue slows producers down rather than
//! losing snapshots. Snapshots from one producer arrive in submission order;
//! across producers only arrival order at the queue holds.

use stackmirror_core::StackSnapshot;
use tokio::sync::mpsc;

use crate::error::{Result, SyncError};

/// Default number of snapshots buffered before producers wait.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Create a connected producer/consumer pair holding up to `capacity`
/// snapshots. A capacity of zero is raised to one.
pub fn channel(capacity: usize) -> (ChannelHub, MappingReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ChannelHub { sender }, MappingReceiver { receiver })
}

/// Producer handle. Cheap to clone; the queue closes once every clone is
/// dropped.
#[derive(Debug, Clone)]
pub struct ChannelHub {
    sender: mpsc::Sender<StackSnapshot>,
}

impl ChannelHub {
    /// Queue a snapshot, waiting while the queue is full.
    pub async fn enqueue(&self, snapshot: StackSnapshot) -> Result<()> {
        self.sender
            .send(snapshot)
            .await
            .map_err(|e| SyncError::QueueClosed(Box::new(e.0)))
    }

    /// Queue a snapshot without waiting.
    pub fn try_enqueue(&self, snapshot: StackSnapshot) -> Result<()> {
        self.sender.try_send(snapshot).map_err(|e| match e {
            mpsc::error::TrySendError::Full(s) => SyncError::QueueFull(Box::new(s)),
            mpsc::error::TrySendError::Closed(s) => SyncError::QueueClosed(Box::new(s)),
        })
    }

    /// Queue a snapshot from synchronous code, blocking the thread while
    /// the queue is full. Must not be called from inside an async context.
    pub fn blocking_enqueue(&self, snapshot: StackSnapshot) -> Result<()> {
        self.sender
            .blocking_send(snapshot)
            .map_err(|e| SyncError::QueueClosed(Box::new(e.0)))
    }

    /// Whether the worker side has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Consumer handle, owned by exactly one worker.
#[derive(Debug)]
pub struct MappingReceiver {
    receiver: mpsc::Receiver<StackSnapshot>,
}

impl MappingReceiver {
    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn dequeue(&mut self) -> Option<StackSnapshot> {
        self.receiver.recv().await
    }

    /// Take the next snapshot if one is already queued.
    pub fn try_dequeue(&mut self) -> Option<StackSnapshot> {
        self.receiver.try_recv().ok()
    }

    /// Refuse further snapshots. Already queued ones can still be dequeued.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}
