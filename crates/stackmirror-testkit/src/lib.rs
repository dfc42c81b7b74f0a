//! # StackMirror Testkit
//!
//! Testing utilities for StackMirror.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Ready-made snapshots and a store/worker setup
//! - **Generators**: Proptest strategies for logical ids and resources
//! - **Doubles**: A journaling store, a store with injectable failures, and
//!   an owner linker that refuses chosen records
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use stackmirror_core::sanitize;
//! use stackmirror_testkit::generators::logical_id;
//!
//! proptest! {
//!     #[test]
//!     fn sanitize_is_idempotent(id in logical_id()) {
//!         let once = sanitize(&id);
//!         prop_assert_eq!(sanitize(&once), once);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use stackmirror_testkit::fixtures::{bucket_snapshot, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let snapshot = bucket_snapshot();
//! assert_eq!(snapshot.resources.len(), 1);
//! ```

pub mod doubles;
pub mod fixtures;
pub mod generators;

pub use doubles::{Call, FailingLinker, FlakyStore, Operation, RecordingStore};
pub use fixtures::{bucket_snapshot, sample_snapshot, TestFixture};
pub use generators::{logical_id, resource_status, stack_snapshot};
