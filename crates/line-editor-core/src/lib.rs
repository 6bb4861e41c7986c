#![warn(missing_docs)]
//! Line Editor Core - Headless Line-Based Text Editing Engine
//!
//! # Overview
//!
//! `line-editor-core` is the in-memory editing kernel of a line-based text or code editor
//! widget. It owns the document text as a sequence of lines, tracks the caret and selection,
//! performs every content mutation and records each one so it can be undone and redone
//! exactly. Rendering, layout, input handling and file I/O are left to the front end.
//!
//! # Core Features
//!
//! - **Line Storage**: `Vec<String>` with clamped, splice-based range operations
//! - **Exact Undo/Redo**: before/after snapshots of the touched line range, with grouping
//! - **Unicode Aware**: character-indexed positions, grapheme and word-run navigation
//! - **Longest Line Tracking**: display width via `unicode-width`, recomputed lazily
//! - **Search**: line-scoped find and replace-all as a single undoable edit
//! - **State Tracking**: version counter, dirty tracking and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Command Interface & State Management       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  EditorSession (caret, selection, config)   │  ← Document Session
//! ├─────────────────────────────────────────────┤
//! │  EditEngine + UndoRedoManager               │  ← Recorded Mutations
//! ├─────────────────────────────────────────────┤
//! │  Cursor / Selection / Search                │  ← Positions & Queries
//! ├─────────────────────────────────────────────┤
//! │  LineBuffer + LongestLineCache              │  ← Line Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Using the Session
//!
//! ```rust
//! use line_editor_core::{CursorPosition, EditorSession};
//!
//! let mut session = EditorSession::from_text("abc\ndef");
//! session.set_selection(CursorPosition::new(0, 1), CursorPosition::new(1, 1));
//! session.insert_text("Z").unwrap();
//! assert_eq!(session.text(), "aZef");
//! assert_eq!(session.cursor_position(), CursorPosition::new(0, 2));
//!
//! session.undo();
//! assert_eq!(session.text(), "abc\ndef");
//! ```
//!
//! ## Using Command Interface
//!
//! ```rust
//! use line_editor_core::{Command, CommandExecutor, CursorCommand, CursorPosition, EditCommand};
//!
//! let mut executor = CommandExecutor::new("fn main() {\n}");
//! executor
//!     .execute(Command::Cursor(CursorCommand::MoveTo { line: 0, character: 11 }))
//!     .unwrap();
//! executor.execute(Command::Edit(EditCommand::InsertNewLine)).unwrap();
//! executor
//!     .execute(Command::Edit(EditCommand::InsertText { text: "    todo!();".to_string() }))
//!     .unwrap();
//!
//! assert_eq!(executor.session().line_text(1), "    todo!();");
//! assert_eq!(executor.session().cursor_position(), CursorPosition::new(1, 12));
//! ```
//!
//! # Module Description
//!
//! - [`line_buffer`] - line storage
//! - [`cursor`] - caret positions and navigation
//! - [`selection`] - selection ranges
//! - [`history`] - undo/redo history
//! - [`edit`] - the edit engine
//! - [`search`] - find and replace helpers
//! - [`session`] - one document being edited
//! - [`commands`] - unified command interface
//! - [`state`] - state snapshots and change notifications
//!
//! # Logging
//!
//! The crate logs through `tracing` and never installs a subscriber. Large edits, history
//! trimming and storage compaction log at `debug`; per-edit shapes at `trace`; allocation
//! retries at `warn`.

pub mod commands;
pub mod config;
pub mod cursor;
pub mod edit;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod line_ending;
pub mod longest_line;
pub mod search;
pub mod selection;
pub mod session;
pub mod state;
mod text;

pub use commands::{Command, CommandExecutor, CommandResult, CursorCommand, EditCommand};
pub use config::EditorConfig;
pub use cursor::{CharClass, CursorPosition, Movement, steps_to_move_left, steps_to_move_right};
pub use edit::EditEngine;
pub use error::{CommandError, EditError};
pub use history::{
    CaretState, DEFAULT_MAX_UNDO_DEPTH, EditSpan, PreparedSplice, UndoRedoItem, UndoRedoManager,
};
pub use line_buffer::{DEFAULT_COMPACTION_THRESHOLD, LineBuffer};
pub use line_ending::LineEnding;
pub use longest_line::{LongestLine, LongestLineCache};
pub use search::{LineReplacement, SearchError, SearchMatch, SearchOptions, SearchQuery};
pub use selection::{LineInclusion, OrderedSelection, SelectionModel, TextSelection};
pub use session::{AutoPairHook, EditorSession};
pub use state::{
    CursorState, DocumentState, EditorState, EditorStateManager, StateChange,
    StateChangeCallback, StateChangeType, UndoRedoState,
};
