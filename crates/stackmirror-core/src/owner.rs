//! Owner linking: mark a record as controlled by its parent stack.
//!
//! The store's garbage collector follows controller references, so a linked
//! record is removed automatically when its stack is removed. Nothing in
//! StackMirror ever deletes a record itself.

use crate::error::OwnerLinkError;
use crate::record::{OwnerReference, Record};
use crate::types::StackOwner;

/// Attaches parent ownership metadata to a record.
///
/// Implementations must be idempotent: linking an already linked record to
/// the same owner is harmless. On error the record must be left unchanged.
pub trait OwnerLinker: Send + Sync {
    fn link(&self, owner: &StackOwner, record: &mut Record) -> Result<(), OwnerLinkError>;
}

/// Controller reference semantics.
///
/// - The owner needs a kind, name and uid.
/// - Owner and record must live in the same namespace.
/// - A record controlled by a different owner is never taken over.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerLinker;

impl OwnerLinker for ControllerLinker {
    fn link(&self, owner: &StackOwner, record: &mut Record) -> Result<(), OwnerLinkError> {
        if owner.kind.is_empty() {
            return Err(OwnerLinkError::MissingIdentity("kind"));
        }
        if owner.name.is_empty() {
            return Err(OwnerLinkError::MissingIdentity("name"));
        }
        if owner.uid.is_empty() {
            return Err(OwnerLinkError::MissingIdentity("uid"));
        }

        if owner.namespace != record.namespace {
            return Err(OwnerLinkError::CrossNamespace {
                owner_namespace: owner.namespace.clone(),
                record_namespace: record.namespace.clone(),
            });
        }

        if let Some(existing) = record.controller() {
            if !existing.refers_to(owner) {
                return Err(OwnerLinkError::AlreadyOwned {
                    record: record.name.clone(),
                    kind: existing.kind.clone(),
                    name: existing.name.clone(),
                    uid: existing.uid.clone(),
                });
            }
        }

        record.owner_reference = Some(OwnerReference::controller_of(owner));
        Ok(())
    }
}

impl<L: OwnerLinker + ?Sized> OwnerLinker for &L {
    fn link(&self, owner: &StackOwner, record: &mut Record) -> Result<(), OwnerLinkError> {
        (**self).link(owner, record)
    }
}

impl<L: OwnerLinker + ?Sized> OwnerLinker for std::sync::Arc<L> {
    fn link(&self, owner: &StackOwner, record: &mut Record) -> Result<(), OwnerLinkError> {
        (**self).link(owner, record)
    }
}
