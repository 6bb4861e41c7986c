//! Editor State Interface
//!
//! Exposes the editor's state to front ends as immutable snapshots, with a version counter
//! and change notifications.
//!
//! - **State Queries**: document, cursor and undo/redo snapshots
//! - **Version Tracking**: the version only moves when a command actually changed something
//! - **Change Notifications**: subscribers run after a command has fully completed
//!
//! # Example
//!
//! ```rust
//! use line_editor_core::{Command, EditCommand, EditorStateManager, StateChangeType};
//! use std::sync::{Arc, Mutex};
//!
//! let mut manager = EditorStateManager::new("Hello");
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! manager.subscribe(move |change| sink.lock().unwrap().push(change.change_type));
//!
//! manager
//!     .execute(Command::Edit(EditCommand::InsertText { text: ">".to_string() }))
//!     .unwrap();
//!
//! assert_eq!(manager.version(), 1);
//! assert!(manager.get_document_state().is_modified);
//! assert_eq!(*seen.lock().unwrap(), vec![StateChangeType::DocumentModified]);
//! ```

use crate::commands::{Command, CommandExecutor, CommandResult};
use crate::cursor::CursorPosition;
use crate::error::CommandError;
use crate::line_ending::LineEnding;
use crate::selection::{OrderedSelection, TextSelection};
use crate::session::EditorSession;
use tracing::trace;

/// Document state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentState {
    /// Number of lines
    pub line_count: usize,
    /// Characters in the joined document, line endings included
    pub char_count: usize,
    /// Line ending used for joining
    pub line_ending: LineEnding,
    /// Whether the document differs from its clean point
    pub is_modified: bool,
    /// State version number
    pub version: u64,
}

/// Cursor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    /// Caret position
    pub position: CursorPosition,
    /// Selection anchors (only when the selection has extent)
    pub selection: Option<TextSelection>,
    /// Document-order view of `selection`
    pub ordered_selection: Option<OrderedSelection>,
}

/// Undo/redo stack state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRedoState {
    /// Can undo
    pub can_undo: bool,
    /// Can redo
    pub can_redo: bool,
    /// Undo stack depth
    pub undo_depth: usize,
    /// Redo stack depth
    pub redo_depth: usize,
    /// Whether the history is at its clean point
    pub is_clean: bool,
}

/// Complete editor state snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    /// Document state
    pub document: DocumentState,
    /// Cursor state
    pub cursor: CursorState,
    /// Undo/redo state
    pub undo_redo: UndoRedoState,
}

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// Document content modified (edits, undo, redo, loads)
    DocumentModified,
    /// Line ending switched
    LineEndingChanged,
    /// Selection changed
    SelectionChanged,
    /// Cursor moved
    CursorMoved,
}

/// State change record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
}

impl StateChange {
    /// Create a new state change record.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
        }
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Observable view of a session, taken before and after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observed {
    revision: u64,
    line_ending: LineEnding,
    cursor: CursorPosition,
    selection: Option<TextSelection>,
}

impl Observed {
    fn of(session: &EditorSession) -> Self {
        Self {
            revision: session.revision(),
            line_ending: session.line_ending(),
            cursor: session.cursor_position(),
            selection: session.selection().filter(TextSelection::has_selection),
        }
    }

    /// The most significant difference between two observations.
    fn change_since(&self, before: &Self) -> Option<StateChangeType> {
        if self.revision != before.revision {
            Some(StateChangeType::DocumentModified)
        } else if self.line_ending != before.line_ending {
            Some(StateChangeType::LineEndingChanged)
        } else if self.selection != before.selection {
            Some(StateChangeType::SelectionChanged)
        } else if self.cursor != before.cursor {
            Some(StateChangeType::CursorMoved)
        } else {
            None
        }
    }
}

/// Editor state manager
///
/// Wraps a [`CommandExecutor`]. Commands go through [`execute`](Self::execute); after each
/// one the manager compares the session with how it looked before, bumps the version if
/// anything changed and notifies subscribers with one [`StateChange`].
///
/// Direct changes through [`session_mut`](Self::session_mut) are not observed; call
/// [`mark_modified`](Self::mark_modified) afterwards.
pub struct EditorStateManager {
    executor: CommandExecutor,
    state_version: u64,
    is_modified: bool,
    callbacks: Vec<StateChangeCallback>,
}

impl std::fmt::Debug for EditorStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorStateManager")
            .field("executor", &self.executor)
            .field("state_version", &self.state_version)
            .field("is_modified", &self.is_modified)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl EditorStateManager {
    /// Create a state manager over a document loaded from `text`.
    pub fn new(text: &str) -> Self {
        Self::with_executor(CommandExecutor::new(text))
    }

    /// Create a state manager over an empty document.
    pub fn empty() -> Self {
        Self::with_executor(CommandExecutor::empty())
    }

    /// Wrap an existing executor.
    pub fn with_executor(executor: CommandExecutor) -> Self {
        Self {
            executor,
            state_version: 0,
            is_modified: false,
            callbacks: Vec::new(),
        }
    }

    /// The executor.
    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// The session.
    pub fn session(&self) -> &EditorSession {
        self.executor.session()
    }

    /// The session, mutably. Changes made here are not tracked automatically.
    pub fn session_mut(&mut self) -> &mut EditorSession {
        self.executor.session_mut()
    }

    /// Execute a command and publish the resulting change, if any.
    ///
    /// A command that succeeds without changing anything (backspace at the document start,
    /// moving left from `(0, 0)`) leaves the version alone.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        let before = Observed::of(self.executor.session());
        let result = self.executor.execute(command)?;
        let after = Observed::of(self.executor.session());

        if let Some(change_type) = after.change_since(&before) {
            self.mark_modified(change_type);
        }
        Ok(result)
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

    /// Get current version number
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Check if state has changed since a version
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.state_version > version
    }

    /// Subscribe to state changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Bump the version and notify subscribers.
    pub fn mark_modified(&mut self, change_type: StateChangeType) {
        let old_version = self.state_version;
        self.state_version += 1;

        if change_type == StateChangeType::DocumentModified {
            self.is_modified = !self.executor.is_clean();
        }

        trace!(?change_type, version = self.state_version, "state changed");
        let change = StateChange::new(change_type, old_version, self.state_version);
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }

    /// Mark the document as saved.
    pub fn mark_saved(&mut self) {
        self.executor.mark_clean();
        self.is_modified = false;
    }

    /// Get the complete state.
    pub fn get_full_state(&self) -> EditorState {
        EditorState {
            document: self.get_document_state(),
            cursor: self.get_cursor_state(),
            undo_redo: self.get_undo_redo_state(),
        }
    }

    /// Get document state.
    pub fn get_document_state(&self) -> DocumentState {
        let session = self.session();
        let line_ending = session.line_ending();
        let text_chars: usize = session.buffer().iter().map(|l| l.chars().count()).sum();
        DocumentState {
            line_count: session.line_count(),
            char_count: text_chars + (session.line_count() - 1) * line_ending.char_len(),
            line_ending,
            is_modified: self.is_modified,
            version: self.state_version,
        }
    }

    /// Get cursor state.
    pub fn get_cursor_state(&self) -> CursorState {
        let session = self.session();
        let selection = session.selection().filter(TextSelection::has_selection);
        CursorState {
            position: session.cursor_position(),
            selection,
            ordered_selection: selection.map(|s| s.ordered()),
        }
    }

    /// Get undo/redo state.
    pub fn get_undo_redo_state(&self) -> UndoRedoState {
        let session = self.session();
        UndoRedoState {
            can_undo: session.can_undo(),
            can_redo: session.can_redo(),
            undo_depth: session.undo_depth(),
            redo_depth: session.redo_depth(),
            is_clean: session.is_clean(),
        }
    }
}
