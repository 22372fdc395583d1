//! Tests for JSON export and outline rendering

use std::sync::Arc;
use std::thread;

use serde_json::json;

use rsflow::application::services::{deserialize, from_json, render, serialize, to_json};
use rsflow::application::ApplicationError;
use rsflow::domain::{insert, relabel, Node, NodeId, NodeKind, WorkflowTree};

fn built_tree() -> WorkflowTree {
    let tree = insert(&WorkflowTree::new(), &NodeId::root(), NodeKind::Branch, None).unwrap();
    let branch = tree.root().children()[0].id().clone();
    let tree = relabel(&tree, &branch, "Paid?").unwrap();
    let tree = insert(&tree, &branch, NodeKind::Action, Some(0)).unwrap();
    let tree = insert(&tree, &branch, NodeKind::End, Some(1)).unwrap();
    let tree = insert(&tree, &branch, NodeKind::Branch, Some(1)).unwrap();
    let ship = tree.find(&branch).unwrap().children()[0].id().clone();
    insert(&tree, &ship, NodeKind::End, None).unwrap()
}

#[test]
fn given_root_only_tree_when_serializing_then_mirrors_variant_shape() {
    let value = serialize(&WorkflowTree::new()).unwrap();

    assert_eq!(
        value,
        json!({"type": "action", "id": "root", "label": "Start", "child": null})
    );
}

#[test]
fn given_branch_when_serializing_then_paths_carry_labels_and_nodes() {
    let tree = insert(&WorkflowTree::new(), &NodeId::root(), NodeKind::Branch, None).unwrap();

    let value = serialize(&tree).unwrap();

    let branch = &value["child"];
    assert_eq!(branch["type"], "branch");
    assert_eq!(branch["label"], "Branch");
    assert_eq!(
        branch["paths"],
        json!([{"label": "True", "nodes": []}, {"label": "False", "nodes": []}])
    );
}

#[test]
fn given_built_tree_when_round_tripping_value_then_equal() {
    let tree = built_tree();

    let restored = deserialize(serialize(&tree).unwrap()).unwrap();

    assert_eq!(restored, tree);
    assert_eq!(restored.ids(), tree.ids());
}

#[test]
fn given_built_tree_when_round_tripping_json_text_then_equal() {
    let tree = built_tree();

    let restored = from_json(&to_json(&tree).unwrap()).unwrap();

    assert_eq!(restored, tree);
}

/// Root followed by `depth - 1` chained actions and a closing end node.
fn deep_chain(depth: usize) -> WorkflowTree {
    let mut child = Some(Arc::new(Node::End {
        id: NodeId::new("end"),
        label: "End".into(),
    }));
    for n in (1..depth).rev() {
        child = Some(Arc::new(Node::Action {
            id: NodeId::new(format!("a{n}")),
            label: format!("Step {n}"),
            child,
        }));
    }
    let root = Arc::new(Node::Action {
        id: NodeId::root(),
        label: "Start".into(),
        child,
    });
    WorkflowTree::from_root(root).unwrap()
}

// recursive drop and comparison need more than the default test stack
fn with_large_stack(f: impl FnOnce() + Send + 'static) {
    thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn given_deep_chain_when_round_tripping_json_text_then_equal() {
    with_large_stack(|| {
        let tree = deep_chain(500);

        let text = to_json(&tree).unwrap();
        let restored = from_json(&text).unwrap();

        assert_eq!(restored.node_count(), 501);
        assert_eq!(restored, tree);
    });
}

#[test]
fn given_deep_chain_when_round_tripping_value_then_equal() {
    with_large_stack(|| {
        let tree = deep_chain(500);

        let restored = deserialize(serialize(&tree).unwrap()).unwrap();

        assert_eq!(restored, tree);
    });
}

#[test]
fn given_json_with_trailing_content_when_parsing_then_errors() {
    let mut text = to_json(&WorkflowTree::new()).unwrap();
    text.push_str(" {}");

    assert!(matches!(
        from_json(&text),
        Err(ApplicationError::Serialization(_))
    ));
}

#[test]
fn given_end_node_json_then_has_no_downstream_field() {
    let tree = insert(&WorkflowTree::new(), &NodeId::root(), NodeKind::End, None).unwrap();

    let value = serialize(&tree).unwrap();

    let end = value["child"].as_object().unwrap();
    assert_eq!(end.len(), 3);
    assert!(!end.contains_key("child"));
    assert!(!end.contains_key("paths"));
}

#[test]
fn given_json_with_non_action_root_when_deserializing_then_errors() {
    let value = json!({"type": "end", "id": "root", "label": "End"});

    let err = deserialize(value).unwrap_err();

    assert!(matches!(err, ApplicationError::Serialization(_)));
    assert!(err.to_string().contains("root must be an action"), "{}", err);
}

#[test]
fn given_json_with_wrong_root_id_when_deserializing_then_errors() {
    let value = json!({"type": "action", "id": "start", "label": "Start", "child": null});

    let err = deserialize(value).unwrap_err();

    assert!(err.to_string().contains("root id must be 'root'"), "{}", err);
}

#[test]
fn given_json_with_duplicate_ids_when_deserializing_then_errors() {
    let value = json!({
        "type": "action", "id": "root", "label": "Start",
        "child": {
            "type": "branch", "id": "b", "label": "Branch",
            "paths": [
                {"label": "True", "nodes": [{"type": "end", "id": "x", "label": "End"}]},
                {"label": "False", "nodes": [{"type": "end", "id": "x", "label": "End"}]}
            ]
        }
    });

    let err = deserialize(value).unwrap_err();

    assert!(err.to_string().contains("duplicate node id: x"), "{}", err);
}

#[test]
fn given_action_json_without_child_field_when_deserializing_then_child_is_empty() {
    let value = json!({"type": "action", "id": "root", "label": "Start"});

    let tree = deserialize(value).unwrap();

    assert!(matches!(tree.root().as_ref(), Node::Action { child: None, .. }));
}

#[test]
fn given_built_tree_when_rendering_then_outline_lists_paths_and_nodes() {
    let tree = built_tree();

    let text = render(&tree).to_string();

    assert!(text.starts_with("[ACTION] Start (root)\n"));
    assert!(text.contains("[BRANCH] Paid? ("));
    assert!(text.contains("True:"));
    assert!(text.contains("False:"));
    assert_eq!(text.matches("[END] End (").count(), 2);
    assert_eq!(text.matches("[ACTION] New Action (").count(), 1);
}
