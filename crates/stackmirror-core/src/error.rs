//! Error types for StackMirror Core.

use thiserror::Error;

/// Errors raised while linking a record to its owning stack.
///
/// A link failure is local to the one record being written. The record is
/// left untouched when linking fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnerLinkError {
    #[error("owner is missing its {0}")]
    MissingIdentity(&'static str),

    #[error("cross-namespace owner references are disallowed: owner in {owner_namespace:?}, record in {record_namespace:?}")]
    CrossNamespace {
        owner_namespace: String,
        record_namespace: String,
    },

    #[error("record {record} is already controlled by {kind} {name} ({uid})")]
    AlreadyOwned {
        record: String,
        kind: String,
        name: String,
        uid: String,
    },
}
