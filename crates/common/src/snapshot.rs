//! The shared snapshot cell
//!
//! The orchestrator is the only writer; every HTTP handler and metric scrape
//! is a reader. Publication replaces the inner `Arc` wholesale, so a reader
//! always holds either the previous complete snapshot or the new one, never
//! a half-updated mixture. Superseded snapshots are dropped once the last
//! reader releases them.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::ExecutionSnapshot;

/// Cloneable handle to the currently-published execution snapshot
#[derive(Clone)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<ExecutionSnapshot>>>,
}

impl SnapshotStore {
    /// Create a store holding the empty pre-first-run snapshot
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(ExecutionSnapshot::default()))),
        }
    }

    /// Replace the published snapshot
    pub fn publish(&self, snapshot: ExecutionSnapshot) {
        *self.current.write() = Arc::new(snapshot);
    }

    /// The currently-published snapshot
    pub fn current(&self) -> Arc<ExecutionSnapshot> {
        self.current.read().clone()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
