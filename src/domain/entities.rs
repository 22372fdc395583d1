//! Domain entities: workflow nodes and tree snapshots

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::error::{DomainError, DomainResult};

/// Identity of the root node. Fixed for the lifetime of every tree.
pub const ROOT_ID: &str = "root";

/// Label of the root node in a fresh tree.
pub const ROOT_LABEL: &str = "Start";

/// Unique node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The closed set of node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Action,
    Branch,
    End,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Action => "action",
            NodeKind::Branch => "branch",
            NodeKind::End => "end",
        }
    }

    /// Label given to freshly created nodes of this kind.
    pub fn default_label(self) -> &'static str {
        match self {
            NodeKind::Action => "New Action",
            NodeKind::Branch => "Branch",
            NodeKind::End => "End",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown node kind '{0}' (expected action, branch or end)")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "action" => Ok(NodeKind::Action),
            "branch" => Ok(NodeKind::Branch),
            "end" => Ok(NodeKind::End),
            _ => Err(UnknownNodeKind(s.to_string())),
        }
    }
}

/// Shared handle to an immutable node. Snapshots share untouched subtrees through it.
pub type NodeRef = Arc<Node>;

/// A unit of the workflow tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// Chain link with at most one downstream node.
    Action {
        id: NodeId,
        label: String,
        #[serde(default)]
        child: Option<NodeRef>,
    },
    /// Fork into independent paths.
    Branch {
        id: NodeId,
        label: String,
        paths: Vec<BranchPath>,
    },
    /// Terminal node, never has a downstream node.
    End { id: NodeId, label: String },
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Action { id, .. } | Node::Branch { id, .. } | Node::End { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Node::Action { label, .. } | Node::Branch { label, .. } | Node::End { label, .. } => {
                label
            }
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Action { .. } => NodeKind::Action,
            Node::Branch { .. } => NodeKind::Branch,
            Node::End { .. } => NodeKind::End,
        }
    }

    /// Whether an insert under this node can change the tree.
    pub fn accepts_children(&self) -> bool {
        !matches!(self, Node::End { .. })
    }

    /// Same node with a different label. Children are shared, not copied.
    pub fn with_label(&self, label: impl Into<String>) -> Node {
        let label = label.into();
        match self {
            Node::Action { id, child, .. } => Node::Action {
                id: id.clone(),
                label,
                child: child.clone(),
            },
            Node::Branch { id, paths, .. } => Node::Branch {
                id: id.clone(),
                label,
                paths: paths.clone(),
            },
            Node::End { id, .. } => Node::End {
                id: id.clone(),
                label,
            },
        }
    }

    /// Direct downstream nodes: the action child, or every member of every branch path.
    pub fn children(&self) -> Vec<&NodeRef> {
        match self {
            Node::Action { child, .. } => child.iter().collect(),
            Node::Branch { paths, .. } => paths.iter().flat_map(|p| p.nodes.iter()).collect(),
            Node::End { .. } => Vec::new(),
        }
    }
}

/// A named arm of a branch.
///
/// `nodes` holds independent sibling subtrees in insertion order, not a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPath {
    pub label: String,
    #[serde(default)]
    pub nodes: Vec<NodeRef>,
}

impl BranchPath {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            nodes: Vec::new(),
        }
    }
}

/// Immutable whole-tree snapshot.
///
/// The root is always an `Action` with id [`ROOT_ID`] and all ids are unique.
/// Cloning is cheap: only the root handle is copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NodeRef", into = "NodeRef")]
pub struct WorkflowTree {
    root: NodeRef,
}

impl Default for WorkflowTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowTree {
    /// Root-only tree: `{ id: "root", type: action, label: "Start", child: none }`.
    pub fn new() -> Self {
        Self {
            root: Arc::new(Node::Action {
                id: NodeId::root(),
                label: ROOT_LABEL.to_string(),
                child: None,
            }),
        }
    }

    /// Wrap a foreign root after checking root shape and id uniqueness.
    pub fn from_root(root: NodeRef) -> DomainResult<Self> {
        match root.as_ref() {
            Node::Action { id, .. } if id.is_root() => {}
            Node::Action { id, .. } => {
                return Err(DomainError::InvalidRoot(format!(
                    "root id must be '{}', found '{}'",
                    ROOT_ID, id
                )))
            }
            other => {
                return Err(DomainError::InvalidRoot(format!(
                    "root must be an action, found {}",
                    other.kind()
                )))
            }
        }

        let mut seen = HashSet::new();
        for node in Preorder::new(&root) {
            if !seen.insert(node.id().clone()) {
                return Err(DomainError::DuplicateId(node.id().clone()));
            }
        }

        Ok(Self { root })
    }

    /// Caller guarantees the invariants `from_root` checks.
    pub(crate) fn from_root_unchecked(root: NodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Pre-order iteration over every node.
    pub fn iter(&self) -> Preorder<'_> {
        Preorder::new(&self.root)
    }

    pub fn find(&self, id: &NodeId) -> Option<&NodeRef> {
        self.iter().find(|node| node.id() == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// All ids in pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.iter().map(|node| node.id().clone()).collect()
    }

    /// Root and unknown ids cannot be removed.
    pub fn is_removable(&self, id: &NodeId) -> bool {
        !id.is_root() && self.contains(id)
    }

    /// True when both snapshots hold the very same root allocation.
    pub fn shares_root_with(&self, other: &WorkflowTree) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

impl TryFrom<NodeRef> for WorkflowTree {
    type Error = DomainError;

    fn try_from(root: NodeRef) -> Result<Self, Self::Error> {
        Self::from_root(root)
    }
}

impl From<WorkflowTree> for NodeRef {
    fn from(tree: WorkflowTree) -> Self {
        tree.root
    }
}

/// Stack-based pre-order iterator, left to right.
pub struct Preorder<'a> {
    stack: Vec<&'a NodeRef>,
}

impl<'a> Preorder<'a> {
    fn new(root: &'a NodeRef) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in current.children().into_iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}
