//! The mirrored record and its owner reference.
//!
//! The serialized shape is fixed so store-side tooling can read it:
//!
//! ```text
//! {
//!   "Name": "...", "Namespace": "...",
//!   "Data": {"LogicalId", "PhysicalId", "Type", "Status", "StatusReason"},
//!   "OwnerReference": {"Kind", "Name", "UID", "Controller"}
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ResourceStatus, StackOwner};

/// Keys of [`Record::data`]. A synced record holds exactly these.
pub mod data_keys {
    pub const LOGICAL_ID: &str = "LogicalId";
    pub const PHYSICAL_ID: &str = "PhysicalId";
    pub const TYPE: &str = "Type";
    pub const STATUS: &str = "Status";
    pub const STATUS_REASON: &str = "StatusReason";

    pub const ALL: [&str; 5] = [LOGICAL_ID, PHYSICAL_ID, TYPE, STATUS, STATUS_REASON];
}

/// Link from a record to the resource controlling it.
///
/// The store's garbage collector deletes a record once the resource named
/// here is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OwnerReference {
    pub kind: String,
    pub name: String,
    #[serde(rename = "UID")]
    pub uid: String,
    pub controller: bool,
}

impl OwnerReference {
    /// A controller reference to `owner`.
    pub fn controller_of(owner: &StackOwner) -> Self {
        Self {
            kind: owner.kind.clone(),
            name: owner.name.clone(),
            uid: owner.uid.clone(),
            controller: true,
        }
    }

    /// Whether this reference names `owner`.
    pub fn refers_to(&self, owner: &StackOwner) -> bool {
        self.kind == owner.kind && self.name == owner.name && self.uid == owner.uid
    }
}

/// The store artifact mirroring one child resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub name: String,
    pub namespace: String,
    pub data: BTreeMap<String, String>,
    pub owner_reference: Option<OwnerReference>,
}

impl Record {
    /// An empty record with only its identity set.
    pub fn stub(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            data: BTreeMap::new(),
            owner_reference: None,
        }
    }

    /// Replace `data` with the five fields of `resource`.
    ///
    /// Any other key previously present is dropped.
    pub fn set_status(&mut self, resource: &ResourceStatus) {
        let mut data = BTreeMap::new();
        data.insert(data_keys::LOGICAL_ID.to_string(), resource.logical_id.clone());
        data.insert(data_keys::PHYSICAL_ID.to_string(), resource.physical_id.clone());
        data.insert(data_keys::TYPE.to_string(), resource.resource_type.clone());
        data.insert(data_keys::STATUS.to_string(), resource.status.clone());
        data.insert(data_keys::STATUS_REASON.to_string(), resource.status_reason.clone());
        self.data = data;
    }

    /// The controlling owner reference, if any.
    pub fn controller(&self) -> Option<&OwnerReference> {
        self.owner_reference.as_ref().filter(|r| r.controller)
    }

    /// Whether this record is controlled by the owner with `uid`.
    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.controller().is_some_and(|r| r.uid == uid)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> ResourceStatus {
        ResourceStatus::new(
            "My Bucket!!",
            "arn:aws:s3:::mb",
            "AWS::S3::Bucket",
            "CREATE_COMPLETE",
            "",
        )
    }

    #[test]
    fn test_set_status_replaces_data() {
        let mut record = Record::stub("ns1", "my bucket");
        record.data.insert("Stale".into(), "value".into());

        record.set_status(&bucket());

        assert_eq!(record.data.len(), 5);
        assert!(record.get("Stale").is_none());
        assert_eq!(record.get(data_keys::LOGICAL_ID), Some("My Bucket!!"));
        assert_eq!(record.get(data_keys::PHYSICAL_ID), Some("arn:aws:s3:::mb"));
        assert_eq!(record.get(data_keys::TYPE), Some("AWS::S3::Bucket"));
        assert_eq!(record.get(data_keys::STATUS), Some("CREATE_COMPLETE"));
        assert_eq!(record.get(data_keys::STATUS_REASON), Some(""));
    }

    #[test]
    fn test_wire_shape() {
        let owner = StackOwner::stack("ns1", "stk-1", "uid-1");
        let mut record = Record::stub("ns1", "my bucket");
        record.set_status(&bucket());
        record.owner_reference = Some(OwnerReference::controller_of(&owner));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Name"], "my bucket");
        assert_eq!(json["Namespace"], "ns1");
        assert_eq!(json["Data"]["LogicalId"], "My Bucket!!");
        assert_eq!(json["Data"]["StatusReason"], "");
        assert_eq!(json["OwnerReference"]["Kind"], "Stack");
        assert_eq!(json["OwnerReference"]["Name"], "stk-1");
        assert_eq!(json["OwnerReference"]["UID"], "uid-1");
        assert_eq!(json["OwnerReference"]["Controller"], true);

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_is_owned_by_requires_controller() {
        let owner = StackOwner::stack("ns1", "stk-1", "uid-1");
        let mut record = Record::stub("ns1", "a");
        assert!(!record.is_owned_by("uid-1"));

        let mut reference = OwnerReference::controller_of(&owner);
        reference.controller = false;
        record.owner_reference = Some(reference);
        assert!(!record.is_owned_by("uid-1"));

        record.owner_reference = Some(OwnerReference::controller_of(&owner));
        assert!(record.is_owned_by("uid-1"));
        assert!(!record.is_owned_by("uid-2"));
    }
}
