//! Store and linker doubles.
//!
//! Wrap a real store to observe or break it.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use stackmirror_core::{ControllerLinker, OwnerLinkError, OwnerLinker, Record, StackOwner};
use stackmirror_store::{CascadeStore, RecordStore, Result, StoreError};

/// A store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
    Update,
}

/// One journaled store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Operation,
    pub namespace: String,
    pub name: String,
}

impl Call {
    pub fn new(op: Operation, namespace: &str, name: &str) -> Self {
        Self {
            op,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

/// Journals every get/create/update before forwarding it.
pub struct RecordingStore<S> {
    inner: S,
    calls: Mutex<Vec<Call>>,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Calls so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Calls so far as `(operation, name)` pairs.
    pub fn ops(&self) -> Vec<(Operation, String)> {
        self.calls().into_iter().map(|c| (c.op, c.name)).collect()
    }

    pub fn count(&self, op: Operation) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    fn push(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for RecordingStore<S> {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Record>> {
        self.push(Call::new(Operation::Get, namespace, name));
        self.inner.get(namespace, name).await
    }

    async fn create(&self, record: &Record) -> Result<()> {
        self.push(Call::new(Operation::Create, &record.namespace, &record.name));
        self.inner.create(record).await
    }

    async fn update(&self, record: &Record) -> Result<()> {
        self.push(Call::new(Operation::Update, &record.namespace, &record.name));
        self.inner.update(record).await
    }
}

#[async_trait]
impl<S: CascadeStore> CascadeStore for RecordingStore<S> {
    async fn list(&self, namespace: &str) -> Result<Vec<Record>> {
        self.inner.list(namespace).await
    }

    async fn delete_owned_by(&self, owner_uid: &str) -> Result<usize> {
        self.inner.delete_owned_by(owner_uid).await
    }
}

/// Fails chosen operations on chosen record names with `Unavailable`.
pub struct FlakyStore<S> {
    inner: S,
    failures: Mutex<HashSet<(Operation, String)>>,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failures: Mutex::new(HashSet::new()),
        }
    }

    /// Make `op` on `name` fail until [`heal`](Self::heal) is called.
    pub fn fail(self, op: Operation, name: &str) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert((op, name.to_string()));
        }
        self
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.clear();
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self, op: Operation, name: &str) -> Result<()> {
        let failing = self
            .failures
            .lock()
            .map(|f| f.contains(&(op, name.to_string())))
            .unwrap_or(false);

        if failing {
            return Err(StoreError::Unavailable(format!(
                "injected {:?} failure on {}",
                op, name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for FlakyStore<S> {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Record>> {
        self.check(Operation::Get, name)?;
        self.inner.get(namespace, name).await
    }

    async fn create(&self, record: &Record) -> Result<()> {
        self.check(Operation::Create, &record.name)?;
        self.inner.create(record).await
    }

    async fn update(&self, record: &Record) -> Result<()> {
        self.check(Operation::Update, &record.name)?;
        self.inner.update(record).await
    }
}

/// Refuses to link the listed record names; links the rest like
/// [`ControllerLinker`].
#[derive(Debug, Default)]
pub struct FailingLinker {
    refuse: HashSet<String>,
}

impl FailingLinker {
    pub fn refusing<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            refuse: names.into_iter().map(String::from).collect(),
        }
    }
}

impl OwnerLinker for FailingLinker {
    fn link(
        &self,
        owner: &StackOwner,
        record: &mut Record,
    ) -> std::result::Result<(), OwnerLinkError> {
        if self.refuse.contains(&record.name) {
            return Err(OwnerLinkError::AlreadyOwned {
                record: record.name.clone(),
                kind: owner.kind.clone(),
                name: "someone-else".to_string(),
                uid: "uid-someone-else".to_string(),
            });
        }
        ControllerLinker.link(owner, record)
    }
}
