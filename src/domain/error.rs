//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::{NodeId, NodeKind};

/// Domain errors represent rejected edits and malformed trees.
/// Identity misses and guarded no-ops are not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("path index {index} out of range for branch {branch} ({paths} paths)")]
    InvalidPathIndex {
        branch: NodeId,
        index: usize,
        paths: usize,
    },

    #[error("branch {0} requires a path index")]
    MissingPathIndex(NodeId),

    #[error("transform turned {expected} ({expected_kind}) into {found} ({found_kind})")]
    IdentityChanged {
        expected: NodeId,
        expected_kind: NodeKind,
        found: NodeId,
        found_kind: NodeKind,
    },

    #[error("invalid root: {0}")]
    InvalidRoot(String),

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
