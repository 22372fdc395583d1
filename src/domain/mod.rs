//! Domain layer: workflow tree model, mutation engine and history
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod factory;
pub mod history;
pub mod mutation;

pub use entities::{
    BranchPath, Node, NodeId, NodeKind, NodeRef, Preorder, UnknownNodeKind, WorkflowTree,
    ROOT_ID, ROOT_LABEL,
};
pub use error::{DomainError, DomainResult};
pub use factory::{generate_id, make_node, make_node_with_id, IdStrategy, BRANCH_PATH_LABELS};
pub use history::History;
pub use mutation::{insert, insert_node, locate_and_transform, relabel, remove};
