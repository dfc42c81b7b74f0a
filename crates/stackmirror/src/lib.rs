//! # StackMirror
//!
//! Mirrors the child resources of a stack into individual records, so each
//! resource's current state can be read on its own without parsing the
//! stack's full status.
//!
//! ## Overview
//!
//! - **Snapshots**: every observed change of a stack produces a snapshot
//!   listing its child resources
//! - **Records**: one record per child, named after its sanitized logical id
//! - **Ownership**: every record is controlled by its stack, so the store
//!   removes it when the stack goes away
//! - **Worker**: a single task applies snapshots in arrival order
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stackmirror::{Mirror, MirrorConfig, ResourceStatus, StackSnapshot};
//! use stackmirror::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("records.db").unwrap();
//!     let mirror = Mirror::new(store, MirrorConfig::default());
//!     let worker = mirror.start().unwrap();
//!
//!     let snapshot = StackSnapshot::new("ns1", "stk-1").resource(ResourceStatus::new(
//!         "My Bucket!!",
//!         "arn:aws:s3:::mb",
//!         "AWS::S3::Bucket",
//!         "CREATE_COMPLETE",
//!         "",
//!     ));
//!     mirror.submit(snapshot).await.unwrap();
//!
//!     let report = worker.shutdown().await.unwrap();
//!     println!("{} records written", report.written());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `stackmirror::core` - Data model, sanitizing, owner linking
//! - `stackmirror::store` - Store traits, SQLite and in-memory stores
//! - `stackmirror::sync` - Queue and worker

pub mod error;
pub mod mirror;

pub use stackmirror_core as core;
pub use stackmirror_store as store;
pub use stackmirror_sync as sync;

pub use error::{MirrorError, Result};
pub use mirror::{Mirror, MirrorConfig, WorkerHandle};

pub use stackmirror_core::{
    sanitize, ControllerLinker, OwnerLinkError, OwnerLinker, OwnerReference, Record,
    ResourceStatus, StackOwner, StackSnapshot,
};
pub use stackmirror_store::{CascadeStore, RecordStore};
pub use stackmirror_sync::{
    ChannelHub, GetErrorPolicy, ResourceOutcome, SnapshotReport, WorkerConfig, WorkerReport,
};
