//! # StackMirror Sync
//!
//! The snapshot queue and the worker that mirrors stack resources into
//! individual store records.
//!
//! ## Overview
//!
//! Producers push [`StackSnapshot`](stackmirror_core::StackSnapshot)s into a
//! [`ChannelHub`]. A single [`MapWriter`] owns the matching
//! [`MappingReceiver`] and, for every resource of every snapshot, in order:
//!
//! 1. derives the record name with [`sanitize`](stackmirror_core::sanitize)
//! 2. fetches the record, or starts a fresh stub if it does not exist
//! 3. replaces the record data with the resource's five status fields
//! 4. links the record to the owning stack
//! 5. creates or updates the record
//!
//! ## Key Properties
//!
//! - **Serialized**: one resource at a time, so no create races on a name
//! - **Isolated failures**: one failing resource never stops the others
//! - **No deletes**: stale records go away through the store's cascade
//! - **Stoppable**: the loop honours a `CancellationToken` between snapshots
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stackmirror_core::{ResourceStatus, StackSnapshot};
//! use stackmirror_store::MemoryStore;
//! use stackmirror_sync::{channel, MapWriter, WorkerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn example() {
//!     let config = WorkerConfig::default();
//!     let (hub, receiver) = channel(config.queue_capacity);
//!     let writer = MapWriter::new(MemoryStore::new(), config);
//!
//!     let shutdown = CancellationToken::new();
//!     let worker = tokio::spawn(writer.run(receiver, shutdown.clone()));
//!
//!     let snapshot = StackSnapshot::new("ns1", "stk-1")
//!         .resource(ResourceStatus::new("Bucket", "arn", "AWS::S3::Bucket", "CREATE_COMPLETE", ""));
//!     hub.enqueue(snapshot).await.unwrap();
//!
//!     shutdown.cancel();
//!     let report = worker.await.unwrap();
//!     println!("mirrored {} records", report.written());
//! }
//! ```

pub mod error;
pub mod hub;
pub mod report;
pub mod worker;

pub use error::{Result, SyncError};
pub use hub::{channel, ChannelHub, MappingReceiver, DEFAULT_QUEUE_CAPACITY};
pub use report::{ResourceOutcome, SnapshotReport, WorkerReport};
pub use worker::{GetErrorPolicy, MapWriter, WorkerConfig};
