//! Read-only export of snapshots: JSON records and text outlines

use serde::Deserialize;
use serde_json::Value;
use termtree::Tree;
use tracing::instrument;

use crate::application::ApplicationResult;
use crate::domain::{Node, WorkflowTree};

/// Nested JSON records mirroring the node variants.
///
/// `{"type":"action","id":..,"label":..,"child":..}`,
/// `{"type":"branch","id":..,"label":..,"paths":[{"label":..,"nodes":[..]}]}`,
/// `{"type":"end","id":..,"label":..}`.
pub fn serialize(tree: &WorkflowTree) -> ApplicationResult<Value> {
    Ok(serde_json::to_value(tree)?)
}

/// Inverse of [`serialize`]. Rejects trees with a malformed root or duplicate ids.
///
/// Nesting depth is unbounded: each chained action adds a level.
pub fn deserialize(value: Value) -> ApplicationResult<WorkflowTree> {
    Ok(WorkflowTree::deserialize(serde_stacker::Deserializer::new(value))?)
}

/// Pretty-printed JSON.
#[instrument(level = "debug", skip(tree))]
pub fn to_json(tree: &WorkflowTree) -> ApplicationResult<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

#[instrument(level = "debug", skip(json))]
pub fn from_json(json: &str) -> ApplicationResult<WorkflowTree> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let tree = WorkflowTree::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(tree)
}

/// Text outline of a snapshot.
pub fn render(tree: &WorkflowTree) -> Tree<String> {
    tree.to_outline()
}

/// Conversion into a `termtree` outline.
pub trait OutlineConvert {
    fn to_outline(&self) -> Tree<String>;
}

impl OutlineConvert for Node {
    fn to_outline(&self) -> Tree<String> {
        let title = format!(
            "[{}] {} ({})",
            self.kind().as_str().to_uppercase(),
            self.label(),
            self.id()
        );

        match self {
            Node::Action { child, .. } => {
                Tree::new(title).with_leaves(child.iter().map(|c| c.to_outline()))
            }
            Node::Branch { paths, .. } => {
                let arms = paths.iter().map(|path| {
                    if path.nodes.is_empty() {
                        Tree::new(format!("{}: (empty)", path.label))
                    } else {
                        Tree::new(format!("{}:", path.label))
                            .with_leaves(path.nodes.iter().map(|n| n.to_outline()))
                    }
                });
                Tree::new(title).with_leaves(arms)
            }
            Node::End { .. } => Tree::new(title),
        }
    }
}

impl OutlineConvert for WorkflowTree {
    fn to_outline(&self) -> Tree<String> {
        self.root().to_outline()
    }
}
