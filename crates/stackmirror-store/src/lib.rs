//! # StackMirror Store
//!
//! Storage abstraction for mirrored records. Provides a narrow trait-based
//! interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The worker only ever needs three operations, captured by [`RecordStore`]:
//! get by `(namespace, name)`, create, and update. Cleanup belongs to the
//! store itself and lives behind the separate [`CascadeStore`] trait, which
//! plays the role of the store's garbage collector.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - The async get/create/update capability
//! - [`CascadeStore`] - Listing and owner-driven cascade deletion
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stackmirror_core::Record;
//! use stackmirror_store::{RecordStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("records.db").unwrap();
//!
//!     if store.get("ns1", "my bucket").await.unwrap().is_none() {
//!         store.create(&Record::stub("ns1", "my bucket")).await.unwrap();
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Not found is not an error**: `get` returns `Ok(None)`.
//! - **Create is strict**: creating an existing record returns `AlreadyExists`.
//! - **Update is strict**: updating a missing record returns `NotFound`.
//! - **Cascade**: deleting by owner uid removes every record it controls.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CascadeStore, RecordStore};
