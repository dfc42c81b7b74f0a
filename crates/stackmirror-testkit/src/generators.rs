//! Proptest generators for property-based testing.

use proptest::prelude::*;

use stackmirror_core::{ResourceStatus, StackSnapshot};

/// A logical id as people write them: letters, digits, spaces and the usual
/// punctuation, with the occasional non-ASCII character.
pub fn logical_id() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _.:!é-]{0,40}".prop_map(String::from)
}

/// A logical id that sanitizes to a non-empty name.
pub fn addressable_logical_id() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,15}[ _.:!-]{0,3}".prop_map(String::from)
}

/// A resource status with arbitrary printable fields.
pub fn resource_status() -> impl Strategy<Value = ResourceStatus> {
    (
        addressable_logical_id(),
        "[a-z0-9:/-]{0,30}",
        prop_oneof![
            Just("AWS::S3::Bucket"),
            Just("AWS::SQS::Queue"),
            Just("AWS::IAM::Role"),
        ],
        prop_oneof![
            Just("CREATE_IN_PROGRESS"),
            Just("CREATE_COMPLETE"),
            Just("UPDATE_COMPLETE"),
            Just("DELETE_FAILED"),
        ],
        "[ -~]{0,40}",
    )
        .prop_map(|(logical, physical, kind, status, reason)| {
            ResourceStatus::new(logical, physical, kind, status, reason)
        })
}

/// A snapshot with up to `max_resources` resources.
pub fn stack_snapshot(max_resources: usize) -> impl Strategy<Value = StackSnapshot> {
    (
        "ns[0-9]",
        "stk-[a-z0-9]{1,8}",
        prop::collection::vec(resource_status(), 0..=max_resources),
    )
        .prop_map(|(namespace, stack_id, resources)| {
            StackSnapshot::new(namespace, stack_id).resources(resources)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackmirror_core::{is_sanitized, sanitize};

    proptest! {
        #[test]
        fn test_sanitize_logical_ids(id in logical_id()) {
            let name = sanitize(&id);
            prop_assert!(is_sanitized(&name));
            prop_assert_eq!(sanitize(&name), name);
        }

        #[test]
        fn test_addressable_ids_are_non_empty(id in addressable_logical_id()) {
            prop_assert!(!sanitize(&id).is_empty());
        }

        #[test]
        fn test_snapshot_sizes(snapshot in stack_snapshot(6)) {
            prop_assert!(snapshot.resources.len() <= 6);
            prop_assert_eq!(&snapshot.owner.uid, &snapshot.stack_id);
        }
    }
}
