//! Editing session service
//!
//! Owns the undo/redo history for one session and turns edit commands into
//! committed snapshots.

use std::num::NonZeroUsize;

use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    insert_node, make_node_with_id, mutation, History, IdStrategy, NodeId, NodeKind, WorkflowTree,
};

/// A single edit request from a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Insert {
        parent: NodeId,
        kind: NodeKind,
        path_index: Option<usize>,
    },
    Remove {
        node: NodeId,
    },
    Relabel {
        node: NodeId,
        label: String,
    },
    Undo,
    Redo,
}

/// What an edit did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// A new snapshot became current.
    Committed,
    /// Nothing was committed.
    Unchanged,
    /// Undo/redo moved the cursor.
    Moved,
    /// Undo/redo at the edge of the history.
    AtBoundary,
}

/// Result of an insert.
///
/// `id` is set only when the new node is part of the current snapshot; inserts
/// under an `End` node or an unknown parent leave it `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inserted {
    pub id: Option<NodeId>,
    pub outcome: EditOutcome,
}

/// One editing session.
///
/// Created at session start, mutated only through its edit methods, dropped
/// with the session.
#[derive(Debug, Clone)]
pub struct EditorService {
    history: History,
    ids: IdStrategy,
    skip_noop_commits: bool,
}

impl Default for EditorService {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorService {
    /// Session on a root-only tree with unbounded history.
    pub fn new() -> Self {
        Self::with_options(History::default(), IdStrategy::default(), false)
    }

    /// Session configured from settings, starting at a root-only tree.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_settings_with_tree(settings, WorkflowTree::new())
    }

    /// Session configured from settings, starting at `initial`.
    pub fn from_settings_with_tree(settings: &Settings, initial: WorkflowTree) -> Self {
        let history = match settings.history.max_entries.and_then(NonZeroUsize::new) {
            Some(capacity) => History::with_capacity(initial, capacity),
            None => History::new(initial),
        };
        Self::with_options(history, settings.ids, settings.history.skip_noop_commits)
    }

    pub fn with_options(history: History, ids: IdStrategy, skip_noop_commits: bool) -> Self {
        Self {
            history,
            ids,
            skip_noop_commits,
        }
    }

    pub fn current(&self) -> &WorkflowTree {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    #[instrument(level = "debug", skip(self))]
    pub fn insert(
        &mut self,
        parent: &NodeId,
        kind: NodeKind,
        path_index: Option<usize>,
    ) -> ApplicationResult<Inserted> {
        let id = self.ids.next_id();
        let node = make_node_with_id(kind, None, id.clone());
        let tree = insert_node(self.current(), parent, node, path_index)?;
        let outcome = self.commit(tree);
        let id = self.current().contains(&id).then_some(id);
        if id.is_none() {
            debug!("insert under {} added no node", parent);
        }
        Ok(Inserted { id, outcome })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, node: &NodeId) -> EditOutcome {
        if node.is_root() {
            return EditOutcome::Unchanged;
        }
        let tree = mutation::remove(self.current(), node);
        self.commit(tree)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn relabel(&mut self, node: &NodeId, label: &str) -> ApplicationResult<EditOutcome> {
        if label.trim().is_empty() {
            return Ok(EditOutcome::Unchanged);
        }
        let tree = mutation::relabel(self.current(), node, label)?;
        Ok(self.commit(tree))
    }

    pub fn undo(&mut self) -> EditOutcome {
        if self.history.undo() {
            EditOutcome::Moved
        } else {
            EditOutcome::AtBoundary
        }
    }

    pub fn redo(&mut self) -> EditOutcome {
        if self.history.redo() {
            EditOutcome::Moved
        } else {
            EditOutcome::AtBoundary
        }
    }

    /// Dispatch a command to the matching edit method.
    pub fn apply(&mut self, command: &EditCommand) -> ApplicationResult<EditOutcome> {
        match command {
            EditCommand::Insert {
                parent,
                kind,
                path_index,
            } => self
                .insert(parent, *kind, *path_index)
                .map(|inserted| inserted.outcome),
            EditCommand::Remove { node } => Ok(self.remove(node)),
            EditCommand::Relabel { node, label } => self.relabel(node, label),
            EditCommand::Undo => Ok(self.undo()),
            EditCommand::Redo => Ok(self.redo()),
        }
    }

    fn commit(&mut self, tree: WorkflowTree) -> EditOutcome {
        if self.skip_noop_commits && tree == *self.current() {
            debug!("commit skipped: snapshot unchanged");
            return EditOutcome::Unchanged;
        }
        self.history.commit(tree);
        info!(
            "committed snapshot {} of {}",
            self.history.cursor() + 1,
            self.history.len()
        );
        EditOutcome::Committed
    }
}
