//! Store traits: the abstract interface for record persistence.
//!
//! [`RecordStore`] is everything the worker is allowed to do. The worker
//! never deletes; deletion happens through [`CascadeStore`] when an owner
//! goes away.

use std::sync::Arc;

use async_trait::async_trait;
use stackmirror_core::Record;

use crate::error::{Result, StoreError};

/// Get/create/update over [`Record`], keyed by `(namespace, name)`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record. A missing record is `Ok(None)`.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Record>>;

    /// Store a new record.
    ///
    /// Fails with `AlreadyExists` if `(namespace, name)` is taken.
    async fn create(&self, record: &Record) -> Result<()>;

    /// Replace an existing record wholesale.
    ///
    /// Fails with `NotFound` if `(namespace, name)` is absent.
    async fn update(&self, record: &Record) -> Result<()>;
}

/// The store-side garbage collector.
#[async_trait]
pub trait CascadeStore: RecordStore {
    /// All records in `namespace`, ordered by name.
    async fn list(&self, namespace: &str) -> Result<Vec<Record>>;

    /// Delete every record whose controller reference has `owner_uid`.
    ///
    /// Returns how many records were removed.
    async fn delete_owned_by(&self, owner_uid: &str) -> Result<usize>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Record>> {
        (**self).get(namespace, name).await
    }

    async fn create(&self, record: &Record) -> Result<()> {
        (**self).create(record).await
    }

    async fn update(&self, record: &Record) -> Result<()> {
        (**self).update(record).await
    }
}

#[async_trait]
impl<S: CascadeStore + ?Sized> CascadeStore for Arc<S> {
    async fn list(&self, namespace: &str) -> Result<Vec<Record>> {
        (**self).list(namespace).await
    }

    async fn delete_owned_by(&self, owner_uid: &str) -> Result<usize> {
        (**self).delete_owned_by(owner_uid).await
    }
}

/// Reject records no backend can address.
pub(crate) fn check_identity(record: &Record) -> Result<()> {
    if record.name.is_empty() {
        return Err(StoreError::InvalidRecord(format!(
            "empty name in namespace {:?}",
            record.namespace
        )));
    }
    Ok(())
}
