//! Command interface example
//!
//! Demonstrates how to use `CommandExecutor` to drive the editor.

use line_editor_core::{
    Command, CommandExecutor, CommandResult, CursorCommand, CursorPosition, EditCommand,
    Movement, SearchOptions,
};

fn main() {
    println!("=== Command interface ===\n");

    let mut executor = CommandExecutor::empty();

    // 1. Editing
    println!("1. Editing:");
    executor
        .execute(Command::Edit(EditCommand::InsertText {
            text: "Hello World".to_string(),
        }))
        .unwrap();
    println!("  inserted 'Hello World'");

    executor
        .execute(Command::Cursor(CursorCommand::SetSelection {
            start: CursorPosition::new(0, 6),
            end: CursorPosition::new(0, 11),
        }))
        .unwrap();
    executor
        .execute(Command::Edit(EditCommand::ReplaceSelection {
            text: "Rust".to_string(),
        }))
        .unwrap();
    println!("  replaced 'World' with 'Rust'");
    println!("  text: {:?}\n", executor.session().text());

    // 2. Cursor
    println!("2. Cursor:");
    executor
        .execute(Command::Cursor(CursorCommand::Move {
            movement: Movement::WordLeft,
            extend: true,
        }))
        .unwrap();
    println!("  selected word left of the caret: {:?}", executor.session().selected_text());
    executor
        .execute(Command::Cursor(CursorCommand::MoveTo {
            line: 0,
            character: 5,
        }))
        .unwrap();
    println!("  caret: {:?}\n", executor.session().cursor_position());

    // 3. Multi-line input as one undo step
    println!("3. Grouped edit:");
    executor
        .execute_batch(vec![
            Command::Edit(EditCommand::BeginUndoGroup),
            Command::Cursor(CursorCommand::Move {
                movement: Movement::DocumentEnd,
                extend: false,
            }),
            Command::Edit(EditCommand::InsertNewLine),
            Command::Edit(EditCommand::InsertText {
                text: "second line".to_string(),
            }),
            Command::Edit(EditCommand::EndUndoGroup),
        ])
        .unwrap();
    println!("  lines: {}", executor.session().line_count());
    executor.execute(Command::Edit(EditCommand::Undo)).unwrap();
    println!("  after undo: {:?}\n", executor.session().text());

    // 4. Search
    println!("4. Search:");
    if let Ok(CommandResult::SearchMatch(m)) =
        executor.execute(Command::Cursor(CursorCommand::FindNext {
            query: "rust".to_string(),
            options: SearchOptions {
                case_sensitive: false,
                ..SearchOptions::default()
            },
        }))
    {
        println!("  found at line {} [{}, {})", m.line, m.start, m.end);
    }
    if let Ok(CommandResult::ReplaceResult { replaced }) =
        executor.execute(Command::Edit(EditCommand::ReplaceAll {
            query: "l".to_string(),
            replacement: "L".to_string(),
            options: SearchOptions::default(),
        }))
    {
        println!("  replaced {replaced} occurrence(s): {:?}", executor.session().text());
    }

    // 5. Errors
    println!("\n5. Errors:");
    executor.execute(Command::Edit(EditCommand::Undo)).unwrap();
    match executor.execute(Command::Edit(EditCommand::Redo)) {
        Ok(_) => println!("  redo ok"),
        Err(err) => println!("  redo failed: {err}"),
    }
    match executor.execute(Command::Edit(EditCommand::Redo)) {
        Ok(_) => println!("  redo ok"),
        Err(err) => println!("  redo failed: {err}"),
    }

    println!("\n  commands in history: {}", executor.command_history().len());
}
