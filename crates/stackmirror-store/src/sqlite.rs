//! SQLite implementation of the store traits.
//!
//! The persistent backend for mirrored records. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use stackmirror_core::{OwnerReference, Record};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{check_identity, CascadeStore, RecordStore};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("blocking task failed: {}", e)))?
    }
}

const SELECT_COLUMNS: &str =
    "SELECT namespace, name, data, owner_kind, owner_name, owner_uid, owner_controller FROM records";

/// Raw column values of one `records` row.
struct RecordRow {
    namespace: String,
    name: String,
    data: Vec<u8>,
    owner_kind: Option<String>,
    owner_name: Option<String>,
    owner_uid: Option<String>,
    owner_controller: bool,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        namespace: row.get("namespace")?,
        name: row.get("name")?,
        data: row.get("data")?,
        owner_kind: row.get("owner_kind")?,
        owner_name: row.get("owner_name")?,
        owner_uid: row.get("owner_uid")?,
        owner_controller: row.get("owner_controller")?,
    })
}

impl RecordRow {
    fn into_record(self) -> Result<Record> {
        let data = decode_data(&self.data)?;

        let owner_reference = match (self.owner_kind, self.owner_name, self.owner_uid) {
            (Some(kind), Some(name), Some(uid)) => Some(OwnerReference {
                kind,
                name,
                uid,
                controller: self.owner_controller,
            }),
            (None, None, None) => None,
            _ => {
                return Err(StoreError::Serialization(format!(
                    "partial owner reference on {}/{}",
                    self.namespace, self.name
                )))
            }
        };

        Ok(Record {
            name: self.name,
            namespace: self.namespace,
            data,
            owner_reference,
        })
    }
}

fn encode_data(data: &BTreeMap<String, String>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(data, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_data(bytes: &[u8]) -> Result<BTreeMap<String, String>> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Owner columns for a record, all NULL when unlinked.
fn owner_columns(record: &Record) -> (Option<String>, Option<String>, Option<String>, bool) {
    match &record.owner_reference {
        Some(r) => (
            Some(r.kind.clone()),
            Some(r.name.clone()),
            Some(r.uid.clone()),
            r.controller,
        ),
        None => (None, None, None, false),
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Record>> {
        let namespace = namespace.to_string();
        let name = name.to_string();

        self.blocking(move |conn| {
            let row = conn
                .query_row(
                    &format!("{} WHERE namespace = ?1 AND name = ?2", SELECT_COLUMNS),
                    params![namespace, name],
                    read_row,
                )
                .optional()?;

            row.map(RecordRow::into_record).transpose()
        })
        .await
    }

    async fn create(&self, record: &Record) -> Result<()> {
        check_identity(record)?;
        let record = record.clone();

        self.blocking(move |conn| {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM records WHERE namespace = ?1 AND name = ?2",
                    params![record.namespace, record.name],
                    |row| row.get(0),
                )
                .optional()?;

            if exists.is_some() {
                return Err(StoreError::already_exists(&record.namespace, &record.name));
            }

            let data = encode_data(&record.data)?;
            let (kind, name, uid, controller) = owner_columns(&record);

            conn.execute(
                "INSERT INTO records (
                    namespace, name, data, owner_kind, owner_name, owner_uid,
                    owner_controller, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.namespace,
                    record.name,
                    data,
                    kind,
                    name,
                    uid,
                    controller,
                    now_millis()
                ],
            )?;

            Ok(())
        })
        .await
    }

    async fn update(&self, record: &Record) -> Result<()> {
        check_identity(record)?;
        let record = record.clone();

        self.blocking(move |conn| {
            let data = encode_data(&record.data)?;
            let (kind, name, uid, controller) = owner_columns(&record);

            let changed = conn.execute(
                "UPDATE records SET
                    data = ?3, owner_kind = ?4, owner_name = ?5, owner_uid = ?6,
                    owner_controller = ?7, updated_at = ?8
                 WHERE namespace = ?1 AND name = ?2",
                params![
                    record.namespace,
                    record.name,
                    data,
                    kind,
                    name,
                    uid,
                    controller,
                    now_millis()
                ],
            )?;

            if changed == 0 {
                return Err(StoreError::not_found(&record.namespace, &record.name));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CascadeStore for SqliteStore {
    async fn list(&self, namespace: &str) -> Result<Vec<Record>> {
        let namespace = namespace.to_string();

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE namespace = ?1 ORDER BY name",
                SELECT_COLUMNS
            ))?;
            let rows = stmt.query_map(params![namespace], read_row)?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row?.into_record()?);
            }
            Ok(records)
        })
        .await
    }

    async fn delete_owned_by(&self, owner_uid: &str) -> Result<usize> {
        let owner_uid = owner_uid.to_string();

        self.blocking(move |conn| {
            let removed = conn.execute(
                "DELETE FROM records WHERE owner_uid = ?1 AND owner_controller = 1",
                params![owner_uid],
            )?;

            tracing::debug!(owner_uid = %owner_uid, removed, "cascade delete");
            Ok(removed)
        })
        .await
    }
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackmirror_core::{ResourceStatus, StackOwner};

    fn synced(namespace: &str, logical_id: &str, owner: &StackOwner) -> Record {
        let mut record = Record::stub(namespace, stackmirror_core::sanitize(logical_id));
        record.set_status(&ResourceStatus::new(
            logical_id,
            format!("phys-{}", logical_id),
            "AWS::SQS::Queue",
            "CREATE_COMPLETE",
            "",
        ));
        record.owner_reference = Some(OwnerReference::controller_of(owner));
        record
    }

    #[tokio::test]
    async fn test_sqlite_store_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let owner = StackOwner::stack("ns1", "stk-1", "uid-1");
        let record = synced("ns1", "Queue", &owner);

        assert!(store.get("ns1", "queue").await.unwrap().is_none());
        store.create(&record).await.unwrap();

        let stored = store.get("ns1", "queue").await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_sqlite_store_unlinked_record() {
        let store = SqliteStore::open_memory().unwrap();
        store.create(&Record::stub("ns1", "bare")).await.unwrap();

        let stored = store.get("ns1", "bare").await.unwrap().unwrap();
        assert!(stored.owner_reference.is_none());
        assert!(stored.data.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_store_create_conflict() {
        let store = SqliteStore::open_memory().unwrap();
        store.create(&Record::stub("ns1", "a")).await.unwrap();

        let err = store.create(&Record::stub("ns1", "a")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        // Same name in another namespace is a different record
        store.create(&Record::stub("ns2", "a")).await.unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_store_update() {
        let store = SqliteStore::open_memory().unwrap();
        let owner = StackOwner::stack("ns1", "stk-1", "uid-1");

        let err = store.update(&synced("ns1", "Queue", &owner)).await.unwrap_err();
        assert!(err.is_not_found());

        let mut record = synced("ns1", "Queue", &owner);
        store.create(&record).await.unwrap();

        record.set_status(&ResourceStatus::new(
            "Queue",
            "phys-2",
            "AWS::SQS::Queue",
            "UPDATE_COMPLETE",
            "done",
        ));
        store.update(&record).await.unwrap();

        let stored = store.get("ns1", "queue").await.unwrap().unwrap();
        assert_eq!(stored.get("Status"), Some("UPDATE_COMPLETE"));
        assert_eq!(stored.get("PhysicalId"), Some("phys-2"));
    }

    #[tokio::test]
    async fn test_sqlite_store_cascade() {
        let store = SqliteStore::open_memory().unwrap();
        let a = StackOwner::stack("ns1", "stk-a", "uid-a");
        let b = StackOwner::stack("ns1", "stk-b", "uid-b");

        store.create(&synced("ns1", "One", &a)).await.unwrap();
        store.create(&synced("ns1", "Two", &a)).await.unwrap();
        store.create(&synced("ns1", "Three", &b)).await.unwrap();

        assert_eq!(store.delete_owned_by("uid-a").await.unwrap(), 2);

        let remaining = store.list("ns1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "three");
    }

    #[tokio::test]
    async fn test_sqlite_store_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");
        let owner = StackOwner::stack("ns1", "stk-1", "uid-1");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.create(&synced("ns1", "Bucket", &owner)).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let stored = store.get("ns1", "bucket").await.unwrap().unwrap();
        assert!(stored.is_owned_by("uid-1"));
        assert_eq!(stored.get("LogicalId"), Some("Bucket"));
    }
}
