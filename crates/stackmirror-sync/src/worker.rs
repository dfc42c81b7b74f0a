//! The worker that mirrors stack resources into records.
//!
//! One worker per queue. It processes one resource at a time and awaits
//! every store call, which keeps two writes for the same `(namespace, name)`
//! from ever racing. Errors never leave the loop; they are logged and
//! reported per resource.

use stackmirror_core::{
    sanitize, ControllerLinker, OwnerLinker, Record, ResourceStatus, StackSnapshot,
};
use stackmirror_store::RecordStore;
use tokio_util::sync::CancellationToken;

use crate::hub::{MappingReceiver, DEFAULT_QUEUE_CAPACITY};
use crate::report::{ResourceOutcome, SnapshotReport, WorkerReport};

/// What to do when looking up a record fails for a reason other than
/// "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GetErrorPolicy {
    /// Carry on with an empty record that has no name or namespace, as the
    /// historical controller did. Owner linking rejects it, so nothing is
    /// written and a record owned by another stack is never replaced.
    #[default]
    Overwrite,
    /// Leave the record alone until the next snapshot.
    Skip,
}

/// Configuration for the worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Snapshots buffered before producers wait.
    pub queue_capacity: usize,
    /// Handling of lookup errors other than "not found".
    pub get_error_policy: GetErrorPolicy,
    /// Mirror snapshots still queued when shutdown is requested.
    pub drain_on_shutdown: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            get_error_policy: GetErrorPolicy::default(),
            drain_on_shutdown: true,
        }
    }
}

/// Mirrors every resource of every dequeued snapshot into its own record.
pub struct MapWriter<S: RecordStore, L: OwnerLinker = ControllerLinker> {
    /// The record store.
    store: S,
    /// Sets the owning stack on each record.
    linker: L,
    /// Configuration.
    config: WorkerConfig,
}

impl<S: RecordStore> MapWriter<S> {
    /// Create a worker using controller reference semantics for owners.
    pub fn new(store: S, config: WorkerConfig) -> Self {
        Self::with_linker(store, ControllerLinker, config)
    }
}

impl<S: RecordStore, L: OwnerLinker> MapWriter<S, L> {
    pub fn with_linker(store: S, linker: L, config: WorkerConfig) -> Self {
        Self {
            store,
            linker,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Drain the queue until shutdown is requested or the queue closes.
    ///
    /// Shutdown is only observed between snapshots: a snapshot that has been
    /// dequeued is always mirrored in full.
    pub async fn run(
        self,
        mut receiver: MappingReceiver,
        shutdown: CancellationToken,
    ) -> WorkerReport {
        tracing::info!("map writer started");
        let mut report = WorkerReport::default();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    if self.config.drain_on_shutdown {
                        receiver.close();
                        while let Some(snapshot) = receiver.dequeue().await {
                            report.record(&self.sync_snapshot(&snapshot).await);
                        }
                    }
                    tracing::info!("map writer shutting down");
                    break;
                }

                next = receiver.dequeue() => match next {
                    Some(snapshot) => report.record(&self.sync_snapshot(&snapshot).await),
                    None => {
                        tracing::info!("mapping channel closed");
                        break;
                    }
                },
            }
        }

        tracing::info!(
            snapshots = report.snapshots,
            created = report.created,
            updated = report.updated,
            failed = report.failed,
            "map writer stopped"
        );
        report
    }

    /// Mirror exactly `count` snapshots, or fewer if the queue closes first.
    pub async fn run_for(&self, receiver: &mut MappingReceiver, count: usize) -> WorkerReport {
        let mut report = WorkerReport::default();
        for _ in 0..count {
            match receiver.dequeue().await {
                Some(snapshot) => report.record(&self.sync_snapshot(&snapshot).await),
                None => break,
            }
        }
        report
    }

    /// Mirror every resource of one snapshot, in order.
    pub async fn sync_snapshot(&self, snapshot: &StackSnapshot) -> SnapshotReport {
        tracing::info!(
            namespace = %snapshot.namespace,
            stack_id = %snapshot.stack_id,
            resources = snapshot.resources.len(),
            "synchronizing map"
        );

        let mut report = SnapshotReport::new(&snapshot.namespace, &snapshot.stack_id);
        for resource in &snapshot.resources {
            let outcome = self.sync_resource(snapshot, resource).await;
            report.outcomes.push(outcome);
        }
        report
    }

    /// Get, fill, link and write the record for one resource.
    async fn sync_resource(
        &self,
        snapshot: &StackSnapshot,
        resource: &ResourceStatus,
    ) -> ResourceOutcome {
        let namespace = snapshot.namespace.as_str();
        let stack_id = snapshot.stack_id.as_str();
        let name = sanitize(&resource.logical_id);

        let (mut record, created) = match self.store.get(namespace, &name).await {
            Ok(Some(existing)) => (existing, false),
            Ok(None) => {
                tracing::debug!(namespace, name = %name, stack_id, "map not found, creating");
                (Record::stub(namespace, &name), true)
            }
            Err(error) => match self.config.get_error_policy {
                GetErrorPolicy::Overwrite => {
                    // The fetched object is unknown: keep it empty, never
                    // invent an identity for it.
                    tracing::warn!(
                        namespace, name = %name, stack_id, %error,
                        "map lookup failed, continuing with empty map"
                    );
                    (Record::default(), false)
                }
                GetErrorPolicy::Skip => {
                    tracing::warn!(
                        namespace, name = %name, stack_id, %error,
                        "map lookup failed, skipping"
                    );
                    return ResourceOutcome::GetFailed { name, error };
                }
            },
        };

        record.set_status(resource);

        if let Err(error) = self.linker.link(&snapshot.owner, &mut record) {
            tracing::warn!(
                namespace, name = %name, stack_id, %error,
                "unable to set controller owner"
            );
            return ResourceOutcome::LinkFailed { name, error };
        }

        let written = if created {
            self.store.create(&record).await
        } else {
            self.store.update(&record).await
        };

        match written {
            Ok(()) => {
                tracing::info!(namespace, name = %name, stack_id, created, "map written");
                if created {
                    ResourceOutcome::Created { name }
                } else {
                    ResourceOutcome::Updated { name }
                }
            }
            Err(error) => {
                tracing::warn!(
                    namespace, name = %name, stack_id, created, %error,
                    "failed to create or update map"
                );
                ResourceOutcome::WriteFailed {
                    name,
                    created,
                    error,
                }
            }
        }
    }
}
