//! Outcomes of mirroring snapshots.

use stackmirror_core::OwnerLinkError;
use stackmirror_store::StoreError;

/// What happened to one resource of a snapshot.
#[derive(Debug)]
pub enum ResourceOutcome {
    /// Record did not exist and was created.
    Created { name: String },
    /// Record existed (or was assumed to) and was updated.
    Updated { name: String },
    /// Owner link failed; no write was attempted.
    LinkFailed { name: String, error: OwnerLinkError },
    /// The create or update call failed.
    WriteFailed {
        name: String,
        created: bool,
        error: StoreError,
    },
    /// The lookup failed and the resource was skipped.
    GetFailed { name: String, error: StoreError },
}

impl ResourceOutcome {
    /// The record name the outcome concerns.
    pub fn name(&self) -> &str {
        match self {
            Self::Created { name }
            | Self::Updated { name }
            | Self::LinkFailed { name, .. }
            | Self::WriteFailed { name, .. }
            | Self::GetFailed { name, .. } => name,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Updated { .. })
    }
}

/// Result of mirroring one snapshot.
#[derive(Debug)]
pub struct SnapshotReport {
    pub namespace: String,
    pub stack_id: String,
    /// One entry per resource, in snapshot order.
    pub outcomes: Vec<ResourceOutcome>,
}

impl SnapshotReport {
    pub fn new(namespace: impl Into<String>, stack_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            stack_id: stack_id.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, ResourceOutcome::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, ResourceOutcome::Updated { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| !o.is_written())
    }

    fn count(&self, f: impl Fn(&ResourceOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| f(o)).count()
    }
}

/// Totals over the lifetime of a worker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub snapshots: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

impl WorkerReport {
    pub fn record(&mut self, snapshot: &SnapshotReport) {
        self.snapshots += 1;
        self.created += snapshot.created();
        self.updated += snapshot.updated();
        self.failed += snapshot.failed();
    }

    /// Records created or updated.
    pub fn written(&self) -> usize {
        self.created + self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_report_counts() {
        let mut report = SnapshotReport::new("ns1", "stk-1");
        report.outcomes.push(ResourceOutcome::Created { name: "a".into() });
        report.outcomes.push(ResourceOutcome::Updated { name: "b".into() });
        report.outcomes.push(ResourceOutcome::LinkFailed {
            name: "c".into(),
            error: OwnerLinkError::MissingIdentity("uid"),
        });
        report.outcomes.push(ResourceOutcome::WriteFailed {
            name: "d".into(),
            created: true,
            error: StoreError::InvalidRecord("empty name".into()),
        });

        assert_eq!(report.created(), 1);
        assert_eq!(report.updated(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.outcomes[2].name(), "c");

        let mut totals = WorkerReport::default();
        totals.record(&report);
        totals.record(&report);
        assert_eq!(totals.snapshots, 2);
        assert_eq!(totals.written(), 4);
        assert_eq!(totals.failed, 4);
    }
}
