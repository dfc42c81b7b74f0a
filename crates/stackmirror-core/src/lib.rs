//! # StackMirror Core
//!
//! Pure primitives for StackMirror: stack snapshots, mirrored records,
//! record name sanitizing, and owner linking.
//!
//! This crate contains no I/O, no storage, no async. It is pure computation
//! over the data model the worker moves around.
//!
//! ## Key Types
//!
//! - [`StackSnapshot`] - One observation of a parent stack's status
//! - [`ResourceStatus`] - The facts about one child resource
//! - [`Record`] - The store artifact mirroring one child resource
//! - [`OwnerReference`] - Parent link used for cascade deletion
//! - [`OwnerLinker`] - Attaches the parent link to a record
//!
//! ## Naming
//!
//! Record names are derived with [`sanitize`]: every character outside
//! `[A-Za-z0-9 ]` is dropped and the rest lowercased. Two logical ids that
//! sanitize to the same name share one record; the last write wins.

pub mod error;
pub mod owner;
pub mod record;
pub mod sanitize;
pub mod types;

pub use error::OwnerLinkError;
pub use owner::{ControllerLinker, OwnerLinker};
pub use record::{data_keys, OwnerReference, Record};
pub use sanitize::{is_sanitized, sanitize};
pub use types::{ResourceStatus, StackOwner, StackSnapshot, STACK_KIND};
