//! Stack snapshot types.
//!
//! A [`StackSnapshot`] is produced by whatever watches the parent stack
//! resource, once per observed status change. It is immutable once enqueued.

use serde::{Deserialize, Serialize};

/// Kind recorded in owner references pointing at a stack.
pub const STACK_KIND: &str = "Stack";

/// The facts about one child resource of a stack.
///
/// All fields are opaque strings; nothing is validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceStatus {
    pub logical_id: String,
    pub physical_id: String,
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub status: String,
    pub status_reason: String,
}

impl ResourceStatus {
    pub fn new(
        logical_id: impl Into<String>,
        physical_id: impl Into<String>,
        resource_type: impl Into<String>,
        status: impl Into<String>,
        status_reason: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            physical_id: physical_id.into(),
            resource_type: resource_type.into(),
            status: status.into(),
            status_reason: status_reason.into(),
        }
    }
}

/// Identity of the parent stack resource that owns mirrored records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackOwner {
    pub kind: String,
    pub name: String,
    #[serde(rename = "UID")]
    pub uid: String,
    pub namespace: String,
}

impl StackOwner {
    /// An owner of kind [`STACK_KIND`].
    pub fn stack(
        namespace: impl Into<String>,
        name: impl Into<String>,
        uid: impl Into<String>,
    ) -> Self {
        Self {
            kind: STACK_KIND.to_string(),
            name: name.into(),
            uid: uid.into(),
            namespace: namespace.into(),
        }
    }
}

/// One observation of a parent stack's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackSnapshot {
    pub namespace: String,
    #[serde(rename = "StackID")]
    pub stack_id: String,
    pub owner: StackOwner,
    /// Child resources, in the order they are synchronized.
    pub resources: Vec<ResourceStatus>,
}

impl StackSnapshot {
    /// Create an empty snapshot whose owner is the stack named by `stack_id`.
    pub fn new(namespace: impl Into<String>, stack_id: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let stack_id = stack_id.into();
        Self {
            owner: StackOwner::stack(namespace.clone(), stack_id.clone(), stack_id.clone()),
            namespace,
            stack_id,
            resources: Vec::new(),
        }
    }

    /// Replace the owning stack resource.
    pub fn owned_by(mut self, owner: StackOwner) -> Self {
        self.owner = owner;
        self
    }

    /// Append a child resource.
    pub fn resource(mut self, resource: ResourceStatus) -> Self {
        self.resources.push(resource);
        self
    }

    /// Append several child resources.
    pub fn resources(mut self, resources: impl IntoIterator<Item = ResourceStatus>) -> Self {
        self.resources.extend(resources);
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_default_owner() {
        let snapshot = StackSnapshot::new("ns1", "stk-1");
        assert_eq!(snapshot.owner.kind, STACK_KIND);
        assert_eq!(snapshot.owner.name, "stk-1");
        assert_eq!(snapshot.owner.uid, "stk-1");
        assert_eq!(snapshot.owner.namespace, "ns1");
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_snapshot_keeps_resource_order() {
        let snapshot = StackSnapshot::new("ns1", "stk-1")
            .resource(ResourceStatus::new("A", "", "", "", ""))
            .resources(vec![
                ResourceStatus::new("B", "", "", "", ""),
                ResourceStatus::new("C", "", "", "", ""),
            ]);

        let ids: Vec<_> = snapshot.resources.iter().map(|r| r.logical_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_resource_status_wire_keys() {
        let status = ResourceStatus::new("Bucket", "arn", "AWS::S3::Bucket", "CREATE_COMPLETE", "");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["LogicalId"], "Bucket");
        assert_eq!(json["PhysicalId"], "arn");
        assert_eq!(json["Type"], "AWS::S3::Bucket");
        assert_eq!(json["Status"], "CREATE_COMPLETE");
        assert_eq!(json["StatusReason"], "");
    }
}
