//! The Mirror: unified API for StackMirror.
//!
//! Brings the store, the snapshot queue and the worker together. Producers
//! submit snapshots; one background worker writes the records.

use std::sync::{Arc, Mutex, PoisonError};

use stackmirror_core::{OwnerLinker, Record, StackOwner, StackSnapshot};
use stackmirror_store::{CascadeStore, RecordStore};
use stackmirror_sync::{channel, ChannelHub, MapWriter, MappingReceiver, WorkerConfig, WorkerReport};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{MirrorError, Result};

/// Configuration for the Mirror.
#[derive(Debug, Clone, Default)]
pub struct MirrorConfig {
    /// Worker and queue configuration.
    pub worker: WorkerConfig,
}

/// The main Mirror struct.
///
/// Provides a unified API for:
/// - Submitting stack snapshots
/// - Running the single mirroring worker
/// - Reading mirrored records
/// - Cascading record cleanup when a stack is deleted
pub struct Mirror<S: RecordStore + 'static> {
    /// The storage backend, shared with the worker.
    store: Arc<S>,
    /// Producer side of the snapshot queue.
    hub: ChannelHub,
    /// Consumer side, handed to the worker on start.
    receiver: Mutex<Option<MappingReceiver>>,
    /// Configuration.
    config: MirrorConfig,
}

impl<S: RecordStore + 'static> Mirror<S> {
    /// Create a new mirror. The worker is not running until [`start`](Self::start).
    pub fn new(store: S, config: MirrorConfig) -> Self {
        let (hub, receiver) = channel(config.worker.queue_capacity);
        Self {
            store: Arc::new(store),
            hub,
            receiver: Mutex::new(Some(receiver)),
            config,
        }
    }

    /// A producer handle for the snapshot queue.
    pub fn hub(&self) -> ChannelHub {
        self.hub.clone()
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Queue a snapshot, waiting while the queue is full.
    pub async fn submit(&self, snapshot: StackSnapshot) -> Result<()> {
        Ok(self.hub.enqueue(snapshot).await?)
    }

    /// Read one mirrored record.
    pub async fn record(&self, namespace: &str, name: &str) -> Result<Option<Record>> {
        Ok(self.store.get(namespace, name).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Worker
    // ─────────────────────────────────────────────────────────────────────────

    /// Spawn the worker with controller reference owner semantics.
    ///
    /// Must be called inside a tokio runtime. Only one worker may ever run
    /// per mirror.
    pub fn start(&self) -> Result<WorkerHandle> {
        let receiver = self.take_receiver()?;
        let writer = MapWriter::new(Arc::clone(&self.store), self.config.worker.clone());
        Ok(WorkerHandle::spawn(writer, receiver))
    }

    /// Spawn the worker with a custom owner linker.
    pub fn start_with_linker<L>(&self, linker: L) -> Result<WorkerHandle>
    where
        L: OwnerLinker + 'static,
    {
        let receiver = self.take_receiver()?;
        let writer =
            MapWriter::with_linker(Arc::clone(&self.store), linker, self.config.worker.clone());
        Ok(WorkerHandle::spawn(writer, receiver))
    }

    fn take_receiver(&self) -> Result<MappingReceiver> {
        // The guarded value is a plain Option; a poisoned lock is still usable
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(MirrorError::AlreadyStarted)
    }
}

impl<S: CascadeStore + 'static> Mirror<S> {
    /// All mirrored records in a namespace.
    pub async fn records(&self, namespace: &str) -> Result<Vec<Record>> {
        Ok(self.store.list(namespace).await?)
    }

    /// Run the store's cascade for a deleted stack.
    ///
    /// Removes every record the stack controls and returns how many.
    pub async fn stack_deleted(&self, owner: &StackOwner) -> Result<usize> {
        let removed = self.store.delete_owned_by(&owner.uid).await?;
        tracing::info!(
            namespace = %owner.namespace,
            stack = %owner.name,
            removed,
            "stack deleted, owned maps collected"
        );
        Ok(removed)
    }
}

/// Handle to the running worker task.
pub struct WorkerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<WorkerReport>,
}

impl WorkerHandle {
    fn spawn<S, L>(writer: MapWriter<S, L>, receiver: MappingReceiver) -> Self
    where
        S: RecordStore + 'static,
        L: OwnerLinker + 'static,
    {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(writer.run(receiver, shutdown.clone()));
        Self { shutdown, task }
    }

    /// A token that stops the worker when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether the worker has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the worker and wait for it.
    ///
    /// Snapshots already queued are still mirrored when
    /// `WorkerConfig::drain_on_shutdown` is set.
    pub async fn shutdown(self) -> Result<WorkerReport> {
        self.shutdown.cancel();
        self.join().await
    }

    /// Wait for the worker to stop on its own.
    ///
    /// The worker stops on its own only once the queue closes, which needs
    /// every [`ChannelHub`] dropped. The [`Mirror`] holds one, so drop the
    /// mirror first or this never returns.
    pub async fn join(self) -> Result<WorkerReport> {
        Ok(self.task.await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackmirror_store::MemoryStore;

    #[tokio::test]
    async fn test_start_after_poisoned_lock() {
        let mirror = Arc::new(Mirror::new(MemoryStore::new(), MirrorConfig::default()));

        let poisoner = Arc::clone(&mirror);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.receiver.lock().unwrap();
            panic!("poison the receiver lock");
        })
        .join();
        assert!(mirror.receiver.is_poisoned());

        let worker = mirror.start().unwrap();
        assert!(matches!(mirror.start(), Err(MirrorError::AlreadyStarted)));
        worker.shutdown().await.unwrap();
    }
}
