//! Cached snapshot store and invalidation.
//!
//! Multiple independent editors (paving, concrete, filtration,
//! electrical) each write their own slice of a project; after any
//! committed write the cached aggregate must be marked stale so
//! dependent views recompute from fresh data instead of reading a
//! sibling editor's stale totals.
//!
//! This is an explicit object passed by reference to every editor,
//! never a module-level singleton.

use std::collections::HashMap;

use poolq_model::ProjectCostSnapshot;

#[derive(Debug)]
struct CachedSnapshot {
    snapshot: ProjectCostSnapshot,
    fresh: bool,
}

/// Per-project cache of computed cost snapshots.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: HashMap<String, CachedSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a freshly computed snapshot.
    pub fn insert(&mut self, project_id: impl Into<String>, snapshot: ProjectCostSnapshot) {
        self.entries.insert(
            project_id.into(),
            CachedSnapshot {
                snapshot,
                fresh: true,
            },
        );
    }

    /// Read a cached snapshot; stale entries read as misses.
    pub fn get(&self, project_id: &str) -> Option<&ProjectCostSnapshot> {
        self.entries
            .get(project_id)
            .filter(|cached| cached.fresh)
            .map(|cached| &cached.snapshot)
    }

    /// Whether a cached entry exists and has been invalidated.
    pub fn is_stale(&self, project_id: &str) -> bool {
        self.entries
            .get(project_id)
            .is_some_and(|cached| !cached.fresh)
    }

    /// Mark a project's cached snapshot stale.
    pub fn invalidate(&mut self, project_id: &str) {
        if let Some(cached) = self.entries.get_mut(project_id) {
            cached.fresh = false;
        }
    }

    /// Controller hook: a write for this project has committed.
    pub fn on_write_committed(&mut self, project_id: &str) {
        tracing::debug!(project_id, "snapshot invalidated after committed write");
        self.invalidate(project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_snapshot_is_readable() {
        let mut store = SnapshotStore::new();
        store.insert("proj-1", ProjectCostSnapshot::default());
        assert!(store.get("proj-1").is_some());
        assert!(!store.is_stale("proj-1"));
    }

    #[test]
    fn committed_write_invalidates() {
        let mut store = SnapshotStore::new();
        store.insert("proj-1", ProjectCostSnapshot::default());
        store.on_write_committed("proj-1");

        assert!(store.get("proj-1").is_none());
        assert!(store.is_stale("proj-1"));
    }

    #[test]
    fn reinsert_refreshes() {
        let mut store = SnapshotStore::new();
        store.insert("proj-1", ProjectCostSnapshot::default());
        store.invalidate("proj-1");
        store.insert("proj-1", ProjectCostSnapshot::default());
        assert!(store.get("proj-1").is_some());
    }

    #[test]
    fn invalidating_unknown_project_is_harmless() {
        let mut store = SnapshotStore::new();
        store.invalidate("proj-ghost");
        assert!(store.get("proj-ghost").is_none());
    }
}
