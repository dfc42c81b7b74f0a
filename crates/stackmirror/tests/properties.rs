//! Property tests: arbitrary snapshots through the worker.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use stackmirror::store::MemoryStore;
use stackmirror::sync::MapWriter;
use stackmirror::{sanitize, RecordStore, StackSnapshot, WorkerConfig};
use stackmirror_testkit::{stack_snapshot, Operation, RecordingStore};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

/// Mirror one snapshot into a fresh journaling store.
fn mirror_once(snapshot: &StackSnapshot) -> Arc<RecordingStore<MemoryStore>> {
    let store = Arc::new(RecordingStore::new(MemoryStore::new()));
    let writer = MapWriter::new(Arc::clone(&store), WorkerConfig::default());
    let report = runtime().block_on(writer.sync_snapshot(snapshot));
    assert_eq!(report.outcomes.len(), snapshot.len());
    store
}

proptest! {
    #[test]
    fn test_one_get_then_write_per_resource(snapshot in stack_snapshot(8)) {
        let store = mirror_once(&snapshot);

        let mut seen = HashSet::new();
        let mut expected = Vec::new();
        for resource in &snapshot.resources {
            let name = sanitize(&resource.logical_id);
            expected.push((Operation::Get, name.clone()));
            let write = if seen.insert(name.clone()) {
                Operation::Create
            } else {
                Operation::Update
            };
            expected.push((write, name));
        }

        prop_assert_eq!(store.ops(), expected);
    }

    #[test]
    fn test_last_resource_wins_per_name(snapshot in stack_snapshot(8)) {
        let store = mirror_once(&snapshot);

        for resource in &snapshot.resources {
            let name = sanitize(&resource.logical_id);
            let last = snapshot
                .resources
                .iter()
                .rev()
                .find(|r| sanitize(&r.logical_id) == name)
                .unwrap();

            let record = runtime()
                .block_on(store.get(&snapshot.namespace, &name))
                .unwrap()
                .unwrap();
            prop_assert_eq!(record.get("LogicalId"), Some(last.logical_id.as_str()));
            prop_assert_eq!(record.get("PhysicalId"), Some(last.physical_id.as_str()));
            prop_assert!(record.is_owned_by(&snapshot.stack_id));
        }
    }
}
