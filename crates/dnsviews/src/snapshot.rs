//! Config snapshots and the shared state that publishes them.
//!
//! A snapshot is built off to the side by the refresher and published with a
//! single pointer swap. Queries load whatever snapshot is current when they
//! start and keep it alive until they finish.

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::acl::{ClientAcls, RawClientAcl};
use crate::records::{RawRecordSet, RecordSet};

/// One immutable generation of view configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub(crate) acls: ClientAcls,
    pub(crate) record_sets: HashMap<String, RecordSet>,
}

/// Counts describing a snapshot, for logs and `check` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SnapshotSummary {
    pub views: usize,
    pub networks: usize,
    pub record_sets: usize,
    pub records: usize,
}

impl ConfigSnapshot {
    /// Snapshot with no views; every query is declined.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from the two raw documents.
    ///
    /// Record sets sharing a name are merged in document order, so
    /// last-write-wins also holds across repeated record-set blocks.
    pub fn build(clients: &[RawClientAcl], records: &[RawRecordSet]) -> Self {
        let acls = ClientAcls::from_raw(clients);

        let mut record_sets: HashMap<String, RecordSet> = HashMap::new();
        for raw in records {
            let built = RecordSet::from_raw(raw);
            match record_sets.get_mut(&raw.name) {
                Some(existing) => {
                    for entry in built.iter() {
                        existing.insert(entry.clone());
                    }
                }
                None => {
                    record_sets.insert(raw.name.clone(), built);
                }
            }
        }

        Self { acls, record_sets }
    }

    /// Client groups in declaration order.
    pub fn acls(&self) -> &ClientAcls {
        &self.acls
    }

    /// Record set served to the view called `view`.
    pub fn record_set(&self, view: &str) -> Option<&RecordSet> {
        self.record_sets.get(view)
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            views: self.acls.len(),
            networks: self.acls.groups().iter().map(|g| g.networks().len()).sum(),
            record_sets: self.record_sets.len(),
            records: self.record_sets.values().map(RecordSet::len).sum(),
        }
    }
}

/// Holder of the currently published snapshot.
///
/// Shared between the refresher (single writer) and any number of query
/// tasks. Readers never block on the writer.
#[derive(Debug)]
pub struct ResolverState {
    current: ArcSwap<ConfigSnapshot>,
    generation: AtomicU64,
}

impl ResolverState {
    /// State serving an empty snapshot (generation 0).
    pub fn new() -> Self {
        Self::with_snapshot(ConfigSnapshot::empty())
    }

    pub fn with_snapshot(snapshot: ConfigSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            generation: AtomicU64::new(0),
        }
    }

    /// The snapshot in force right now.
    pub fn current(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Replace the published snapshot, returning the new generation.
    pub fn publish(&self, snapshot: ConfigSnapshot) -> u64 {
        self.current.store(Arc::new(snapshot));
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of successful publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for ResolverState {
    fn default() -> Self {
        Self::new()
    }
}
