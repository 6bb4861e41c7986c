//! Command Interface Layer
//!
//! Wraps an [`EditorSession`] in a command pattern so front ends can drive the editor with
//! plain data (e.g. from a key map or a macro recorder).
//!
//! - **Text Editing**: insert, replace, delete, line operations, undo/redo, replace-all
//! - **Cursor Operations**: move the caret, set or extend the selection, find
//!
//! # Example
//!
//! ```rust
//! use line_editor_core::{Command, CommandExecutor, CursorCommand, EditCommand};
//!
//! let mut executor = CommandExecutor::empty();
//!
//! executor
//!     .execute(Command::Edit(EditCommand::InsertText {
//!         text: "Hello, World!".to_string(),
//!     }))
//!     .unwrap();
//!
//! let commands = vec![
//!     Command::Cursor(CursorCommand::MoveTo { line: 0, character: 5 }),
//!     Command::Edit(EditCommand::InsertNewLine),
//! ];
//! executor.execute_batch(commands).unwrap();
//! assert_eq!(executor.session().text(), "Hello\n, World!");
//! ```

use crate::cursor::{CursorPosition, Movement};
use crate::error::CommandError;
use crate::line_ending::LineEnding;
use crate::search::{SearchMatch, SearchOptions};
use crate::session::EditorSession;
use tracing::trace;

/// Text editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Type or paste at the caret (replacing the selection). Goes through the auto-pair hook.
    InsertText {
        /// Text to insert.
        text: String,
    },
    /// Replace the selection with `text`, bypassing the auto-pair hook.
    ReplaceSelection {
        /// Replacement text.
        text: String,
    },
    /// Delete the selection.
    RemoveSelection,
    /// Delete the selection, or backwards from the caret.
    Backspace {
        /// Delete a whole word run.
        word: bool,
    },
    /// Delete the selection, or forwards from the caret.
    DeleteForward {
        /// Delete a whole word run.
        word: bool,
    },
    /// Break the line at the caret.
    InsertNewLine,
    /// Delete one whole line.
    DeleteLine {
        /// Line index (clamped).
        line: usize,
    },
    /// Undo the last group.
    Undo,
    /// Redo the last undone group.
    Redo,
    /// Open an undo group.
    BeginUndoGroup,
    /// Close the innermost undo group.
    EndUndoGroup,
    /// Replace the document and clear the history.
    LoadText {
        /// New content.
        text: String,
    },
    /// Switch the line ending used for joining.
    SetLineEnding {
        /// New line ending.
        line_ending: LineEnding,
    },
    /// Replace all occurrences of `query` with `replacement` as one undoable edit.
    ReplaceAll {
        /// Search query.
        query: String,
        /// Replacement text.
        replacement: String,
        /// Search options (case sensitivity, whole-word, regex).
        options: SearchOptions,
    },
}

/// Cursor & selection commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// Move the caret to a position (clamped).
    MoveTo {
        /// Target line.
        line: usize,
        /// Target character (clamped to the line length).
        character: usize,
    },
    /// Move the caret by a [`Movement`].
    Move {
        /// Movement to apply.
        movement: Movement,
        /// Extend the selection instead of dropping it.
        extend: bool,
    },
    /// Set the selection.
    SetSelection {
        /// Anchor.
        start: CursorPosition,
        /// Active end.
        end: CursorPosition,
    },
    /// Clear the selection.
    ClearSelection,
    /// Select the whole document.
    SelectAll,
    /// Select one line.
    SelectLine {
        /// Line index (clamped).
        line: usize,
    },
    /// Find the next occurrence of `query` and select it.
    FindNext {
        /// Search query.
        query: String,
        /// Search options.
        options: SearchOptions,
    },
    /// Find the previous occurrence of `query` and select it.
    FindPrev {
        /// Search query.
        query: String,
        /// Search options.
        options: SearchOptions,
    },
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text editing commands
    Edit(EditCommand),
    /// Cursor commands
    Cursor(CursorCommand),
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Success, no return value
    Success,
    /// Success, returns the caret position
    Position(CursorPosition),
    /// Find result
    SearchMatch(SearchMatch),
    /// Replace result: how many occurrences were replaced
    ReplaceResult {
        /// Number of occurrences replaced.
        replaced: usize,
    },
}

/// Command executor
///
/// Executes [`Command`]s against an owned [`EditorSession`] and records every command it was
/// given.
///
/// # Example
///
/// ```rust
/// use line_editor_core::{Command, CommandExecutor, CommandError, EditCommand};
///
/// let mut executor = CommandExecutor::new("abc");
/// executor
///     .execute(Command::Edit(EditCommand::Backspace { word: false }))
///     .unwrap();
/// assert!(matches!(
///     executor.execute(Command::Edit(EditCommand::Redo)),
///     Err(CommandError::NothingToRedo)
/// ));
/// ```
#[derive(Debug, Default)]
pub struct CommandExecutor {
    session: EditorSession,
    command_history: Vec<Command>,
}

impl CommandExecutor {
    /// Create an executor over a document loaded from `text`.
    pub fn new(text: &str) -> Self {
        Self::with_session(EditorSession::from_text(text))
    }

    /// Create an executor over an empty document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an executor over an existing session.
    pub fn with_session(session: EditorSession) -> Self {
        Self {
            session,
            command_history: Vec::new(),
        }
    }

    /// Execute command
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        trace!(?command, "execute");
        self.record(&command);

        match command {
            Command::Edit(edit) => self.execute_edit(edit),
            Command::Cursor(cursor) => self.execute_cursor(cursor),
        }
    }

    /// Execute commands in order, stopping at the first error.
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, CommandError> {
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            results.push(self.execute(command)?);
        }
        Ok(results)
    }

    /// Recent commands, including failed ones.
    ///
    /// Starts at the last `LoadText` and keeps at most as many commands as the session's
    /// undo depth.
    pub fn command_history(&self) -> &[Command] {
        &self.command_history
    }

    fn record(&mut self, command: &Command) {
        if matches!(command, Command::Edit(EditCommand::LoadText { .. })) {
            self.command_history.clear();
        }
        self.command_history.push(command.clone());

        let limit = self.session.config().max_undo_depth;
        if self.command_history.len() > limit {
            let excess = self.command_history.len() - limit;
            self.command_history.drain(..excess);
        }
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    /// Whether the document is at its clean point.
    pub fn is_clean(&self) -> bool {
        self.session.is_clean()
    }

    /// Mark the current state as clean (call after saving).
    pub fn mark_clean(&mut self) {
        self.session.mark_clean();
    }

    /// The session.
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// The session, mutably.
    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    fn execute_edit(&mut self, command: EditCommand) -> Result<CommandResult, CommandError> {
        let session = &mut self.session;
        let result = match command {
            EditCommand::InsertText { text } => {
                CommandResult::Position(session.insert_text(&text)?)
            }
            EditCommand::ReplaceSelection { text } => {
                CommandResult::Position(session.replace_selection(&text)?)
            }
            EditCommand::RemoveSelection => CommandResult::Position(session.remove_selection()),
            EditCommand::Backspace { word } => CommandResult::Position(session.backspace(word)),
            EditCommand::DeleteForward { word } => {
                CommandResult::Position(session.forward_delete(word))
            }
            EditCommand::InsertNewLine => CommandResult::Position(session.insert_new_line()?),
            EditCommand::DeleteLine { line } => {
                CommandResult::Position(session.delete_line(line))
            }
            EditCommand::Undo => {
                if !session.undo() {
                    return Err(CommandError::NothingToUndo);
                }
                CommandResult::Position(session.cursor_position())
            }
            EditCommand::Redo => {
                if !session.redo() {
                    return Err(CommandError::NothingToRedo);
                }
                CommandResult::Position(session.cursor_position())
            }
            EditCommand::BeginUndoGroup => {
                session.begin_undo_group();
                CommandResult::Success
            }
            EditCommand::EndUndoGroup => {
                session.end_undo_group();
                CommandResult::Success
            }
            EditCommand::LoadText { text } => {
                session.load_text(&text);
                CommandResult::Success
            }
            EditCommand::SetLineEnding { line_ending } => {
                session.set_line_ending(line_ending);
                CommandResult::Success
            }
            EditCommand::ReplaceAll {
                query,
                replacement,
                options,
            } => CommandResult::ReplaceResult {
                replaced: session.replace_all(&query, options, &replacement)?,
            },
        };
        Ok(result)
    }

    fn execute_cursor(&mut self, command: CursorCommand) -> Result<CommandResult, CommandError> {
        let session = &mut self.session;
        let result = match command {
            CursorCommand::MoveTo { line, character } => {
                session.clear_selection();
                session.set_cursor_position(CursorPosition::new(line, character));
                CommandResult::Position(session.cursor_position())
            }
            CursorCommand::Move { movement, extend } => {
                CommandResult::Position(session.move_cursor(movement, extend))
            }
            CursorCommand::SetSelection { start, end } => {
                session.set_selection(start, end);
                CommandResult::Success
            }
            CursorCommand::ClearSelection => {
                session.clear_selection();
                CommandResult::Success
            }
            CursorCommand::SelectAll => {
                session.select_all();
                CommandResult::Success
            }
            CursorCommand::SelectLine { line } => {
                session.select_line(line);
                CommandResult::Success
            }
            CursorCommand::FindNext { query, options } => {
                if query.is_empty() {
                    return Err(CommandError::EmptyQuery);
                }
                match session.find_next(&query, options)? {
                    Some(m) => CommandResult::SearchMatch(m),
                    None => return Err(CommandError::NoMatch { query }),
                }
            }
            CursorCommand::FindPrev { query, options } => {
                if query.is_empty() {
                    return Err(CommandError::EmptyQuery);
                }
                match session.find_prev(&query, options)? {
                    Some(m) => CommandResult::SearchMatch(m),
                    None => return Err(CommandError::NoMatch { query }),
                }
            }
        };
        Ok(result)
    }
}
