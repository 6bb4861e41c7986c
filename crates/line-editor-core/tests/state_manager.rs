use line_editor_core::{
    Command, CursorCommand, CursorPosition, EditCommand, EditorStateManager, LineEnding,
    SearchOptions, StateChange, StateChangeType,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn insert(text: &str) -> Command {
    Command::Edit(EditCommand::InsertText {
        text: text.to_string(),
    })
}

fn recorder(manager: &mut EditorStateManager) -> Arc<Mutex<Vec<StateChange>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
    seen
}

#[test]
fn test_full_state_reflects_session() {
    let mut manager = EditorStateManager::new("hello\nworld");
    manager
        .execute(Command::Cursor(CursorCommand::SetSelection {
            start: CursorPosition::new(1, 3),
            end: CursorPosition::new(0, 1),
        }))
        .unwrap();

    let state = manager.get_full_state();
    assert_eq!(state.document.line_count, 2);
    assert_eq!(state.document.char_count, 11);
    assert_eq!(state.document.line_ending, LineEnding::Lf);
    assert_eq!(state.cursor.position, CursorPosition::new(0, 1));

    let ordered = state.cursor.ordered_selection.unwrap();
    assert_eq!(ordered.start(), CursorPosition::new(0, 1));
    assert_eq!(ordered.end(), CursorPosition::new(1, 3));
    assert!(!state.undo_redo.can_undo);
}

#[test]
fn test_versions_are_consecutive_in_notifications() {
    let mut manager = EditorStateManager::empty();
    let seen = recorder(&mut manager);

    manager.execute(insert("a")).unwrap();
    manager.execute(insert("b")).unwrap();
    manager.execute(Command::Edit(EditCommand::Undo)).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    for (index, change) in seen.iter().enumerate() {
        assert_eq!(change.change_type, StateChangeType::DocumentModified);
        assert_eq!(change.old_version, index as u64);
        assert_eq!(change.new_version, index as u64 + 1);
    }
}

#[test]
fn test_undo_redo_state_tracks_stacks() {
    let mut manager = EditorStateManager::empty();
    manager
        .execute_batch(vec![insert("a"), insert("b"), Command::Edit(EditCommand::Undo)])
        .unwrap();

    let undo_redo = manager.get_undo_redo_state();
    assert!(undo_redo.can_undo);
    assert!(undo_redo.can_redo);
    assert_eq!(undo_redo.undo_depth, 1);
    assert_eq!(undo_redo.redo_depth, 1);
    assert!(!undo_redo.is_clean);
}

#[test]
fn test_find_publishes_selection_change_only() {
    let mut manager = EditorStateManager::new("abc abc");
    let seen = recorder(&mut manager);

    manager
        .execute(Command::Cursor(CursorCommand::FindNext {
            query: "abc".to_string(),
            options: SearchOptions::default(),
        }))
        .unwrap();

    let types: Vec<_> = seen.lock().unwrap().iter().map(|c| c.change_type).collect();
    assert_eq!(types, vec![StateChangeType::SelectionChanged]);
    assert!(!manager.get_document_state().is_modified);
}

#[test]
fn test_replace_all_without_match_keeps_version() {
    let mut manager = EditorStateManager::new("abc");
    manager
        .execute(Command::Edit(EditCommand::ReplaceAll {
            query: "zzz".to_string(),
            replacement: "y".to_string(),
            options: SearchOptions::default(),
        }))
        .unwrap();
    assert_eq!(manager.version(), 0);
}

#[test]
fn test_load_text_counts_as_modification_but_is_clean() {
    let mut manager = EditorStateManager::new("abc");
    manager.execute(insert("x")).unwrap();
    assert!(manager.get_document_state().is_modified);

    manager
        .execute(Command::Edit(EditCommand::LoadText {
            text: "fresh".to_string(),
        }))
        .unwrap();
    assert_eq!(manager.version(), 2);
    assert!(!manager.get_document_state().is_modified);
}

#[test]
fn test_direct_session_changes_need_manual_mark() {
    let mut manager = EditorStateManager::new("abc");
    manager.session_mut().insert_text("x").unwrap();
    assert_eq!(manager.version(), 0);

    manager.mark_modified(StateChangeType::DocumentModified);
    assert_eq!(manager.version(), 1);
    assert!(manager.get_document_state().is_modified);
}
