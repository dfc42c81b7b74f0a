//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use stackmirror_core::{ResourceStatus, StackOwner, StackSnapshot};
use stackmirror_store::MemoryStore;
use stackmirror_sync::{channel, ChannelHub, MapWriter, MappingReceiver, WorkerConfig};

use crate::doubles::RecordingStore;

/// The single-bucket stack used throughout the docs:
/// `"My Bucket!!"` in namespace `ns1`, stack `stk-1`.
pub fn bucket_snapshot() -> StackSnapshot {
    StackSnapshot::new("ns1", "stk-1").resource(ResourceStatus::new(
        "My Bucket!!",
        "arn:aws:s3:::mb",
        "AWS::S3::Bucket",
        "CREATE_COMPLETE",
        "",
    ))
}

/// A snapshot of `count` resources named `Resource0`, `Resource1`, ...
pub fn sample_snapshot(namespace: &str, stack_id: &str, count: usize) -> StackSnapshot {
    StackSnapshot::new(namespace, stack_id).resources((0..count).map(|i| {
        ResourceStatus::new(
            format!("Resource{}", i),
            format!("{}-phys-{}", stack_id, i),
            "AWS::SQS::Queue",
            "CREATE_COMPLETE",
            "",
        )
    }))
}

/// A journaling memory store wired to a queue and a worker.
pub struct TestFixture {
    pub store: Arc<RecordingStore<MemoryStore>>,
    pub hub: ChannelHub,
    pub receiver: MappingReceiver,
    pub writer: MapWriter<Arc<RecordingStore<MemoryStore>>>,
}

impl TestFixture {
    /// Create a fixture with default worker configuration.
    pub fn new() -> Self {
        Self::with_config(WorkerConfig::default())
    }

    pub fn with_config(config: WorkerConfig) -> Self {
        let store = Arc::new(RecordingStore::new(MemoryStore::new()));
        let (hub, receiver) = channel(config.queue_capacity);
        let writer = MapWriter::new(Arc::clone(&store), config);
        Self {
            store,
            hub,
            receiver,
            writer,
        }
    }

    /// Owner of a stack in this fixture's conventions.
    pub fn owner(namespace: &str, stack_id: &str) -> StackOwner {
        StackOwner::stack(namespace, stack_id, format!("uid-{}", stack_id))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackmirror_store::RecordStore;

    #[test]
    fn test_sample_snapshot() {
        let snapshot = sample_snapshot("ns1", "stk-1", 3);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.resources[2].logical_id, "Resource2");
        assert_eq!(snapshot.resources[2].physical_id, "stk-1-phys-2");
    }

    #[tokio::test]
    async fn test_fixture_round() {
        let mut fixture = TestFixture::new();
        fixture.hub.enqueue(bucket_snapshot()).await.unwrap();

        let report = fixture.writer.run_for(&mut fixture.receiver, 1).await;
        assert_eq!(report.created, 1);
        assert!(fixture.store.get("ns1", "my bucket").await.unwrap().is_some());
    }
}
