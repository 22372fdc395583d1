//! Tests for EditorService

use rstest::rstest;

use rsflow::application::services::{EditCommand, EditOutcome, EditorService};
use rsflow::application::ApplicationError;
use rsflow::config::{HistorySettings, Settings};
use rsflow::domain::{DomainError, IdStrategy, NodeId, NodeKind, WorkflowTree};
use rsflow::util::testing::init_test_setup;

fn settings(skip_noop_commits: bool, max_entries: Option<usize>) -> Settings {
    Settings {
        history: HistorySettings {
            max_entries,
            skip_noop_commits,
        },
        ids: IdStrategy::Sequential,
        ..Settings::default()
    }
}

#[test]
fn given_new_session_when_inserting_then_commits_and_returns_new_id() {
    init_test_setup();
    let mut editor = EditorService::new();

    let inserted = editor
        .insert(&NodeId::root(), NodeKind::Branch, None)
        .unwrap();

    assert_eq!(inserted.outcome, EditOutcome::Committed);
    assert!(editor.current().contains(&inserted.id.unwrap()));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn given_sequential_ids_when_inserting_then_ids_are_numbered() {
    let mut editor = EditorService::from_settings(&settings(false, None));

    let first = editor.insert(&NodeId::root(), NodeKind::Action, None).unwrap().id.unwrap();
    let second = editor.insert(&first, NodeKind::End, None).unwrap().id.unwrap();

    let n = |id: &NodeId| -> u64 { id.as_str().trim_start_matches("node_").parse().unwrap() };
    assert!(n(&second) > n(&first));
}

#[test]
fn given_root_when_removing_then_nothing_is_committed() {
    let mut editor = EditorService::new();

    let outcome = editor.remove(&NodeId::root());

    assert_eq!(outcome, EditOutcome::Unchanged);
    assert_eq!(editor.history().len(), 1);
}

#[rstest]
#[case("")]
#[case("  ")]
fn given_blank_label_when_relabeling_then_nothing_is_committed(#[case] label: &str) {
    let mut editor = EditorService::new();

    let outcome = editor.relabel(&NodeId::root(), label).unwrap();

    assert_eq!(outcome, EditOutcome::Unchanged);
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn given_default_policy_when_inserting_under_end_then_identical_snapshot_is_committed() {
    let mut editor = EditorService::new();
    let end = editor.insert(&NodeId::root(), NodeKind::End, None).unwrap().id.unwrap();

    let outcome = editor
        .insert(&end, NodeKind::Action, None)
        .unwrap()
        .outcome;

    assert_eq!(outcome, EditOutcome::Committed);
    assert_eq!(editor.history().len(), 3);
    assert_eq!(editor.current().node_count(), 2);
}

#[test]
fn given_skip_noop_policy_when_inserting_under_end_then_nothing_is_committed() {
    let mut editor = EditorService::from_settings(&settings(true, None));
    let end = editor.insert(&NodeId::root(), NodeKind::End, None).unwrap().id.unwrap();

    let outcome = editor
        .insert(&end, NodeKind::Action, None)
        .unwrap()
        .outcome;

    assert_eq!(outcome, EditOutcome::Unchanged);
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn given_skip_noop_policy_when_removing_unknown_id_then_nothing_is_committed() {
    let mut editor = EditorService::from_settings(&settings(true, None));

    assert_eq!(
        editor.remove(&NodeId::new("ghost")),
        EditOutcome::Unchanged
    );
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn given_invalid_path_index_when_inserting_then_errors_and_history_is_untouched() {
    let mut editor = EditorService::new();
    let branch = editor.insert(&NodeId::root(), NodeKind::Branch, None).unwrap().id.unwrap();

    let err = editor
        .insert(&branch, NodeKind::Action, Some(9))
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidPathIndex { index: 9, .. })
    ));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn given_edits_when_undoing_past_start_then_reports_boundary() {
    let mut editor = EditorService::new();
    editor.insert(&NodeId::root(), NodeKind::Action, None).unwrap();

    assert_eq!(editor.undo(), EditOutcome::Moved);
    assert_eq!(editor.undo(), EditOutcome::AtBoundary);
    assert_eq!(editor.current(), &WorkflowTree::new());
    assert_eq!(editor.redo(), EditOutcome::Moved);
    assert_eq!(editor.redo(), EditOutcome::AtBoundary);
}

#[test]
fn given_undo_then_new_edit_when_redoing_then_discarded_edit_stays_gone() {
    let mut editor = EditorService::new();
    editor.relabel(&NodeId::root(), "T1").unwrap();
    editor.relabel(&NodeId::root(), "T2").unwrap();
    editor.undo();
    editor.relabel(&NodeId::root(), "T3").unwrap();

    assert_eq!(editor.redo(), EditOutcome::AtBoundary);
    assert_eq!(editor.current().root().label(), "T3");
}

#[test]
fn given_capped_history_when_committing_then_length_stays_bounded() {
    let mut editor = EditorService::from_settings(&settings(false, Some(2)));

    for label in ["a", "b", "c"] {
        editor.relabel(&NodeId::root(), label).unwrap();
    }

    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.undo(), EditOutcome::Moved);
    assert_eq!(editor.current().root().label(), "b");
    assert_eq!(editor.undo(), EditOutcome::AtBoundary);
}

#[test]
fn given_commands_when_applying_then_dispatches_to_edits() {
    let mut editor = EditorService::new();
    let commands = vec![
        EditCommand::Insert {
            parent: NodeId::root(),
            kind: NodeKind::Action,
            path_index: None,
        },
        EditCommand::Relabel {
            node: NodeId::root(),
            label: "Begin".into(),
        },
        EditCommand::Undo,
        EditCommand::Redo,
        EditCommand::Remove {
            node: NodeId::root(),
        },
    ];

    let outcomes: Vec<EditOutcome> = commands
        .iter()
        .map(|c| editor.apply(c).unwrap())
        .collect();

    assert_eq!(
        outcomes,
        vec![
            EditOutcome::Committed,
            EditOutcome::Committed,
            EditOutcome::Moved,
            EditOutcome::Moved,
            EditOutcome::Unchanged,
        ]
    );
    assert_eq!(editor.current().root().label(), "Begin");
    assert_eq!(editor.current().node_count(), 2);
}

#[test]
fn given_initial_tree_when_creating_session_then_history_starts_there() {
    let mut seed = EditorService::new();
    seed.insert(&NodeId::root(), NodeKind::Branch, None).unwrap();
    let initial = seed.current().clone();

    let mut editor = EditorService::from_settings_with_tree(&Settings::default(), initial.clone());

    assert_eq!(editor.current(), &initial);
    assert_eq!(editor.undo(), EditOutcome::AtBoundary);
}

#[rstest]
#[case::under_end(true)]
#[case::unknown_parent(false)]
fn given_parent_that_takes_no_child_when_inserting_then_no_id_is_returned(
    #[case] under_end: bool,
) {
    let mut editor = EditorService::new();
    let parent = if under_end {
        editor.insert(&NodeId::root(), NodeKind::End, None).unwrap().id.unwrap()
    } else {
        NodeId::new("ghost")
    };
    let nodes_before = editor.current().node_count();

    let inserted = editor.insert(&parent, NodeKind::Action, None).unwrap();

    assert_eq!(inserted.id, None);
    assert_eq!(editor.current().node_count(), nodes_before);
}
