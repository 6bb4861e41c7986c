//! State management example
//!
//! Demonstrates how to use `EditorStateManager` to query editor state and observe changes.

use line_editor_core::{Command, CursorCommand, EditCommand, EditorStateManager, Movement};
use std::sync::{Arc, Mutex};

fn main() {
    println!("=== State management ===\n");

    let mut manager =
        EditorStateManager::new("fn main() {\n    println!(\"Hello, World!\");\n}\n");

    println!("1. Initial document:");
    print_document_state(&manager);

    println!("\n2. Change notifications:");
    let change_count = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&change_count);
    manager.subscribe(move |change| {
        let mut count = counter.lock().unwrap();
        *count += 1;
        println!(
            "  change #{}: {:?} (version {} -> {})",
            count, change.change_type, change.old_version, change.new_version
        );
    });

    manager
        .execute(Command::Cursor(CursorCommand::MoveTo {
            line: 1,
            character: 4,
        }))
        .unwrap();
    manager
        .execute(Command::Cursor(CursorCommand::Move {
            movement: Movement::LineEnd,
            extend: true,
        }))
        .unwrap();
    manager
        .execute(Command::Edit(EditCommand::InsertText {
            text: "todo!();".to_string(),
        }))
        .unwrap();
    // Does not change anything, so nothing is published.
    manager
        .execute(Command::Cursor(CursorCommand::ClearSelection))
        .unwrap();

    println!("\n3. After editing:");
    print_document_state(&manager);
    print_cursor_state(&manager);

    println!("\n4. Version tracking:");
    let version = manager.version();
    println!("  current version: {version}");
    println!("  changed since 0: {}", manager.has_changed_since(0));
    println!(
        "  changed since {version}: {}",
        manager.has_changed_since(version)
    );

    println!("\n5. Saving:");
    manager.mark_saved();
    println!("  modified: {}", manager.get_document_state().is_modified);
    manager.execute(Command::Edit(EditCommand::Undo)).unwrap();
    println!(
        "  modified after undo: {}",
        manager.get_document_state().is_modified
    );

    println!("\n6. Full snapshot:");
    let state = manager.get_full_state();
    println!("  lines: {}", state.document.line_count);
    println!("  chars: {}", state.document.char_count);
    println!("  caret: {:?}", state.cursor.position);
    println!(
        "  undo/redo depth: {}/{}",
        state.undo_redo.undo_depth, state.undo_redo.redo_depth
    );
    println!("  total changes: {}", *change_count.lock().unwrap());
}

fn print_document_state(manager: &EditorStateManager) {
    let state = manager.get_document_state();
    println!("  lines: {}", state.line_count);
    println!("  chars: {}", state.char_count);
    println!("  line ending: {:?}", state.line_ending);
    println!("  modified: {}", state.is_modified);
    println!("  version: {}", state.version);
}

fn print_cursor_state(manager: &EditorStateManager) {
    let state = manager.get_cursor_state();
    println!(
        "  caret: line {}, character {}",
        state.position.line, state.position.character
    );
    println!("  selection: {:?}", state.ordered_selection);
}
