//! rsflow: conditional-branching workflow trees
//!
//! - [`domain`]: node variants, the persistent mutation engine and undo/redo history
//! - [`application`]: editing sessions, JSON/outline export and edit scripts
//! - [`cli`]: the `rsflow` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::services::{EditCommand, EditOutcome, EditorService};
pub use domain::{History, Node, NodeId, NodeKind, WorkflowTree};
