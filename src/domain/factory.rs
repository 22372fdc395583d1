//! Node construction: defaults per variant and id generation

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{BranchPath, Node, NodeId, NodeKind};

/// Labels of the two paths every new branch starts with.
pub const BRANCH_PATH_LABELS: [&str; 2] = ["True", "False"];

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// How fresh node ids are produced.
///
/// Both strategies are unique within the process lifetime, also for calls
/// landing in the same clock tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `node_<uuid-v4>`
    #[default]
    Random,
    /// `node_<n>` from a process-wide counter
    Sequential,
}

impl IdStrategy {
    pub fn next_id(self) -> NodeId {
        match self {
            IdStrategy::Random => NodeId::new(format!("node_{}", Uuid::new_v4().simple())),
            IdStrategy::Sequential => {
                NodeId::new(format!("node_{}", SEQUENCE.fetch_add(1, Ordering::Relaxed)))
            }
        }
    }
}

/// Fresh id from the default strategy.
pub fn generate_id() -> NodeId {
    IdStrategy::default().next_id()
}

/// Create a node with a fresh id and variant defaults.
pub fn make_node(kind: NodeKind, label: Option<&str>) -> Node {
    make_node_with_id(kind, label, generate_id())
}

/// Create a node with variant defaults under a caller-chosen id.
///
/// Action: empty child slot. Branch: two empty paths "True"/"False". End: nothing downstream.
pub fn make_node_with_id(kind: NodeKind, label: Option<&str>, id: NodeId) -> Node {
    let label = label.unwrap_or(kind.default_label()).to_string();
    match kind {
        NodeKind::Action => Node::Action {
            id,
            label,
            child: None,
        },
        NodeKind::Branch => Node::Branch {
            id,
            label,
            paths: BRANCH_PATH_LABELS.iter().map(|l| BranchPath::new(*l)).collect(),
        },
        NodeKind::End => Node::End { id, label },
    }
}
