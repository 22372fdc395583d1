//! Linear undo/redo history over immutable snapshots.

use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::domain::entities::WorkflowTree;

/// Snapshot stack with a cursor.
///
/// Invariant: `cursor < snapshots.len()`, and the stack is never empty.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<WorkflowTree>,
    cursor: usize,
    capacity: Option<NonZeroUsize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(WorkflowTree::new())
    }
}

impl History {
    /// Unbounded history starting at `initial`.
    pub fn new(initial: WorkflowTree) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            capacity: None,
        }
    }

    /// History keeping at most `capacity` snapshots; the oldest are dropped first.
    pub fn with_capacity(initial: WorkflowTree, capacity: NonZeroUsize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new(initial)
        }
    }

    /// Drop every snapshot past the cursor, append `tree` and move onto it.
    pub fn commit(&mut self, tree: WorkflowTree) {
        let discarded = self.snapshots.len() - self.cursor - 1;
        if discarded > 0 {
            debug!("commit: discarding {} redo snapshot(s)", discarded);
        }
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(tree);

        if let Some(capacity) = self.capacity {
            let overflow = self.snapshots.len().saturating_sub(capacity.get());
            if overflow > 0 {
                trace!("commit: evicting {} oldest snapshot(s)", overflow);
                self.snapshots.drain(..overflow);
            }
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. Returns false at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step forward one snapshot. Returns false at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        if self.cursor + 1 >= self.snapshots.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn current(&self) -> &WorkflowTree {
        &self.snapshots[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: a history holds at least its initial snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }
}
