//! Mutation engine: locate-and-transform traversal and the edits built on it.
//!
//! Every edit returns a new snapshot and leaves its input untouched. Nodes on
//! the path from the root to the edited node are rebuilt; all other subtrees
//! are shared with the input through their `Arc` handles.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::entities::{BranchPath, Node, NodeId, NodeKind, NodeRef, WorkflowTree};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::factory::make_node;

/// Replace the node with id `target` by `transform(node)`.
///
/// An identity miss returns the input snapshot (same root allocation). The
/// transform must keep the target's id and variant, and the resulting tree
/// must keep all ids unique; violations are reported as errors.
pub fn locate_and_transform<F>(
    tree: &WorkflowTree,
    target: &NodeId,
    transform: F,
) -> DomainResult<WorkflowTree>
where
    F: Fn(&Node) -> DomainResult<Node>,
{
    match rebuild(tree.root(), target, &transform)? {
        Some(root) => WorkflowTree::from_root(root),
        None => {
            trace!("locate_and_transform: {} not found", target);
            Ok(tree.clone())
        }
    }
}

/// Pre-order search. `None` means the target is not in this subtree.
fn rebuild<F>(node: &NodeRef, target: &NodeId, transform: &F) -> DomainResult<Option<NodeRef>>
where
    F: Fn(&Node) -> DomainResult<Node>,
{
    if node.id() == target {
        let replacement = transform(node)?;
        if replacement.id() != node.id() || replacement.kind() != node.kind() {
            return Err(DomainError::IdentityChanged {
                expected: node.id().clone(),
                expected_kind: node.kind(),
                found: replacement.id().clone(),
                found_kind: replacement.kind(),
            });
        }
        return Ok(Some(Arc::new(replacement)));
    }

    match node.as_ref() {
        Node::Action { id, label, child } => {
            let Some(child) = child else {
                return Ok(None);
            };
            Ok(rebuild(child, target, transform)?.map(|child| {
                Arc::new(Node::Action {
                    id: id.clone(),
                    label: label.clone(),
                    child: Some(child),
                })
            }))
        }
        Node::Branch { id, label, paths } => {
            for (path_index, path) in paths.iter().enumerate() {
                for (slot, member) in path.nodes.iter().enumerate() {
                    if let Some(replacement) = rebuild(member, target, transform)? {
                        // ids are unique, so the first hit is the only one
                        let mut paths = paths.clone();
                        paths[path_index].nodes[slot] = replacement;
                        return Ok(Some(Arc::new(Node::Branch {
                            id: id.clone(),
                            label: label.clone(),
                            paths,
                        })));
                    }
                }
            }
            Ok(None)
        }
        Node::End { .. } => Ok(None),
    }
}

/// Insert a fresh `kind` node under `parent`.
///
/// - `End` parent: tree content unchanged.
/// - `Branch` parent: appended to path `path_index`; a missing or out-of-range
///   index is an error.
/// - `Action` parent: replaces the child slot, discarding any previous subtree.
///
/// `path_index` is ignored for `Action` and `End` parents.
#[instrument(level = "debug", skip(tree))]
pub fn insert(
    tree: &WorkflowTree,
    parent: &NodeId,
    kind: NodeKind,
    path_index: Option<usize>,
) -> DomainResult<WorkflowTree> {
    insert_node(tree, parent, make_node(kind, None), path_index)
}

/// Like [`insert`], with a node the caller already built.
pub fn insert_node(
    tree: &WorkflowTree,
    parent: &NodeId,
    node: Node,
    path_index: Option<usize>,
) -> DomainResult<WorkflowTree> {
    let node = Arc::new(node);
    locate_and_transform(tree, parent, |target| attach(target, &node, path_index))
}

fn attach(parent: &Node, node: &NodeRef, path_index: Option<usize>) -> DomainResult<Node> {
    match parent {
        Node::End { id, .. } => {
            debug!("insert under end node {} ignored", id);
            Ok(parent.clone())
        }
        Node::Branch { id, label, paths } => {
            let index = path_index.ok_or_else(|| DomainError::MissingPathIndex(id.clone()))?;
            if index >= paths.len() {
                return Err(DomainError::InvalidPathIndex {
                    branch: id.clone(),
                    index,
                    paths: paths.len(),
                });
            }
            let mut paths = paths.clone();
            paths[index].nodes.push(Arc::clone(node));
            Ok(Node::Branch {
                id: id.clone(),
                label: label.clone(),
                paths,
            })
        }
        Node::Action { id, label, child } => {
            if let Some(discarded) = child {
                debug!("insert under {} discards subtree {}", id, discarded.id());
            }
            Ok(Node::Action {
                id: id.clone(),
                label: label.clone(),
                child: Some(Arc::clone(node)),
            })
        }
    }
}

/// Result of folding one subtree during removal.
enum Pruned {
    Unchanged,
    Replaced(NodeRef),
    Absent,
}

/// Remove `node_id`.
///
/// An `Action` with a downstream node is replaced by that node (promotion);
/// any other target disappears together with its whole subtree. Removing the
/// root or an unknown id returns the input snapshot.
#[instrument(level = "debug", skip(tree))]
pub fn remove(tree: &WorkflowTree, node_id: &NodeId) -> WorkflowTree {
    if node_id.is_root() {
        debug!("remove: root is not removable");
        return tree.clone();
    }

    match prune(tree.root(), node_id) {
        Pruned::Replaced(root) => WorkflowTree::from_root_unchecked(root),
        // the root only resolves to Absent when it is the target, handled above
        Pruned::Unchanged | Pruned::Absent => tree.clone(),
    }
}

fn prune(node: &NodeRef, target: &NodeId) -> Pruned {
    if node.id() == target {
        return match node.as_ref() {
            Node::Action {
                child: Some(child), ..
            } => Pruned::Replaced(Arc::clone(child)),
            _ => Pruned::Absent,
        };
    }

    match node.as_ref() {
        Node::Action {
            id,
            label,
            child: Some(child),
        } => {
            let child = match prune(child, target) {
                Pruned::Unchanged => return Pruned::Unchanged,
                Pruned::Replaced(replacement) => Some(replacement),
                Pruned::Absent => None,
            };
            Pruned::Replaced(Arc::new(Node::Action {
                id: id.clone(),
                label: label.clone(),
                child,
            }))
        }
        Node::Action { child: None, .. } | Node::End { .. } => Pruned::Unchanged,
        Node::Branch { id, label, paths } => {
            let mut changed = false;
            let mut rebuilt = Vec::with_capacity(paths.len());
            for path in paths {
                let mut nodes = Vec::with_capacity(path.nodes.len());
                for member in &path.nodes {
                    match prune(member, target) {
                        Pruned::Unchanged => nodes.push(Arc::clone(member)),
                        Pruned::Replaced(replacement) => {
                            changed = true;
                            nodes.push(replacement);
                        }
                        Pruned::Absent => changed = true,
                    }
                }
                rebuilt.push(BranchPath {
                    label: path.label.clone(),
                    nodes,
                });
            }
            if !changed {
                return Pruned::Unchanged;
            }
            Pruned::Replaced(Arc::new(Node::Branch {
                id: id.clone(),
                label: label.clone(),
                paths: rebuilt,
            }))
        }
    }
}

/// Set the label of `node_id` to the trimmed `label`.
///
/// Blank or whitespace-only labels leave the tree unchanged.
#[instrument(level = "debug", skip(tree))]
pub fn relabel(tree: &WorkflowTree, node_id: &NodeId, label: &str) -> DomainResult<WorkflowTree> {
    let label = label.trim();
    if label.is_empty() {
        debug!("relabel: blank label for {} ignored", node_id);
        return Ok(tree.clone());
    }
    locate_and_transform(tree, node_id, |node| Ok(node.with_label(label)))
}
