//! Editor session: one document with its caret, selection and history.
//!
//! [`EditorSession`] is the entry point front ends talk to. Queries read the buffer directly;
//! every mutation builds an [`EditEngine`] over the session's parts, lets it record the
//! change, then moves the caret to the returned position and drops the selection.

use crate::config::EditorConfig;
use crate::cursor::{CursorPosition, Movement};
use crate::edit::EditEngine;
use crate::error::{CommandError, EditError};
use crate::history::{CaretState, UndoRedoManager};
use crate::line_buffer::LineBuffer;
use crate::line_ending::{LineEnding, has_line_break, split_lines};
use crate::longest_line::{LongestLine, LongestLineCache};
use crate::search::{self, SearchError, SearchMatch, SearchOptions};
use crate::selection::{OrderedSelection, SelectionModel, TextSelection};
use crate::text::char_len;
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, trace};

/// Hook applied to single-character inserts, e.g. to turn `(` into `()`.
pub type AutoPairHook = Box<dyn Fn(&str) -> String + Send>;

/// A document being edited.
///
/// # Example
///
/// ```rust
/// use line_editor_core::{CursorPosition, EditorSession};
///
/// let mut session = EditorSession::from_text("foo\nbar");
/// session.set_cursor_position(CursorPosition::new(1, 0));
/// session.backspace(false);
/// assert_eq!(session.text(), "foobar");
/// assert_eq!(session.cursor_position(), CursorPosition::new(0, 3));
///
/// session.undo();
/// assert_eq!(session.text(), "foo\nbar");
/// ```
pub struct EditorSession {
    buffer: LineBuffer,
    cursor: CursorPosition,
    selection: SelectionModel,
    history: UndoRedoManager,
    longest: LongestLineCache,
    config: EditorConfig,
    auto_pair: Option<AutoPairHook>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("line_count", &self.buffer.line_count())
            .field("cursor", &self.cursor)
            .field("selection", &self.selection)
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("config", &self.config)
            .field("auto_pair", &self.auto_pair.is_some())
            .finish()
    }
}

impl EditorSession {
    /// Empty document with default settings.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Empty document with `config`.
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            buffer: LineBuffer::new().with_compaction_threshold(config.compaction_threshold),
            cursor: CursorPosition::default(),
            selection: SelectionModel::new(),
            history: UndoRedoManager::new(config.line_ending, config.max_undo_depth),
            longest: LongestLineCache::new(),
            config,
            auto_pair: None,
        }
    }

    /// Document loaded from `text` with default settings (see [`load_text`](Self::load_text)).
    pub fn from_text(text: &str) -> Self {
        let mut session = Self::new();
        session.load_text(text);
        session
    }

    /// Current settings.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The underlying line storage.
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    // Queries

    /// Number of lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// Text of line `index` (clamped).
    pub fn line_text(&self, index: usize) -> &str {
        self.buffer.line(index)
    }

    /// Length in characters of line `index` (clamped).
    pub fn line_len(&self, index: usize) -> usize {
        self.buffer.line_len(index)
    }

    /// Length in characters of the last line.
    pub fn last_line_len(&self) -> usize {
        self.buffer.last_line_len()
    }

    /// `count` lines from `start` joined with the session's line ending.
    pub fn lines_as_string(&self, start: usize, count: usize) -> String {
        self.buffer
            .lines_as_string(start, count, self.config.line_ending)
    }

    /// The whole document joined with the session's line ending.
    pub fn text(&self) -> String {
        self.lines_as_string(0, self.buffer.line_count())
    }

    /// Caret position.
    pub fn cursor_position(&self) -> CursorPosition {
        self.cursor
    }

    /// Current selection anchors, if set.
    pub fn selection(&self) -> Option<TextSelection> {
        self.selection.get().copied()
    }

    /// Document-order view of the selection, if set.
    pub fn ordered_selection(&self) -> Option<OrderedSelection> {
        self.selection.ordered()
    }

    /// `true` if a selection with extent is active.
    pub fn has_selection(&self) -> bool {
        self.selection.has_selection()
    }

    /// Text under the selection, joined with `'\n'`.
    pub fn selected_text(&self) -> Option<String> {
        self.selection
            .effective()
            .map(|selection| selection.text(&self.buffer))
    }

    /// Can undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Can redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Items on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Items on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Counter that changes on every content change (edits, undo, redo, loads).
    pub fn revision(&self) -> u64 {
        self.history.revision()
    }

    /// The widest line, recomputed only if an edit invalidated the cached value.
    pub fn longest_line(&mut self) -> LongestLine {
        self.longest.get(&self.buffer)
    }

    // Mutations

    /// Type or paste `text` at the caret, replacing the selection if there is one.
    ///
    /// Single-character input other than a line break goes through the auto-pair hook
    /// first, if one is set.
    pub fn insert_text(&mut self, text: &str) -> Result<CursorPosition, EditError> {
        let text: Cow<'_, str> = match &self.auto_pair {
            Some(hook) if char_len(text) == 1 && !has_line_break(text) => {
                Cow::Owned(hook(text))
            }
            _ => Cow::Borrowed(text),
        };
        let (selection, cursor) = (self.selection.effective(), self.cursor);
        let pos = self.engine().insert_text(&text, selection, cursor)?;
        Ok(self.finish_edit(pos))
    }

    /// Replace the selection with `text` (a plain insert if nothing is selected).
    pub fn replace_selection(&mut self, text: &str) -> Result<CursorPosition, EditError> {
        let (selection, cursor) = (self.selection.effective(), self.cursor);
        let pos = self.engine().insert_text(text, selection, cursor)?;
        Ok(self.finish_edit(pos))
    }

    /// Delete the selected text. No-op without a selection.
    pub fn remove_selection(&mut self) -> CursorPosition {
        let Some(selection) = self.selection.effective() else {
            return self.cursor;
        };
        let pos = self.engine().remove(selection);
        self.finish_edit(pos)
    }

    /// Delete the selection, or backwards from the caret.
    pub fn backspace(&mut self, word_mode: bool) -> CursorPosition {
        if self.selection.has_selection() {
            return self.remove_selection();
        }
        let cursor = self.cursor;
        let pos = self.engine().backspace(cursor, word_mode);
        self.finish_edit(pos)
    }

    /// Delete the selection, or forwards from the caret.
    pub fn forward_delete(&mut self, word_mode: bool) -> CursorPosition {
        if self.selection.has_selection() {
            return self.remove_selection();
        }
        let cursor = self.cursor;
        let pos = self.engine().forward_delete(cursor, word_mode);
        self.finish_edit(pos)
    }

    /// Break the line at the caret (replacing the selection).
    pub fn insert_new_line(&mut self) -> Result<CursorPosition, EditError> {
        let (selection, cursor) = (self.selection.effective(), self.cursor);
        let pos = self.engine().insert_new_line(selection, cursor)?;
        Ok(self.finish_edit(pos))
    }

    /// Delete line `line` entirely.
    pub fn delete_line(&mut self, line: usize) -> CursorPosition {
        let cursor = self.cursor;
        let pos = self.engine().delete_line(line, cursor);
        self.finish_edit(pos)
    }

    /// Undo the last group. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.buffer) {
            Some(restore) => {
                self.restore_caret(restore);
                true
            }
            None => false,
        }
    }

    /// Redo the last undone group. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.buffer) {
            Some(restore) => {
                self.restore_caret(restore);
                true
            }
            None => false,
        }
    }

    /// Replace the document with `lines` and clear the history.
    ///
    /// Lines containing line breaks are split so stored lines never hold one.
    pub fn load_lines(&mut self, lines: Vec<String>) {
        let lines = if lines.iter().any(|line| has_line_break(line)) {
            lines
                .iter()
                .flat_map(|line| split_lines(line))
                .map(str::to_string)
                .collect()
        } else {
            lines
        };
        debug!(lines = lines.len(), "loading document");

        self.buffer.clear_and_load(lines);
        self.history.clear_all();
        self.longest.invalidate();
        self.cursor = CursorPosition::document_start();
        self.selection.clear();
    }

    /// Replace the document with `text` and clear the history.
    ///
    /// If `text` contains line breaks, the session adopts its dominant line ending.
    pub fn load_text(&mut self, text: &str) {
        if has_line_break(text) {
            self.set_line_ending(LineEnding::detect_in_text(text));
        }
        self.load_lines(split_lines(text).into_iter().map(str::to_string).collect());
    }

    /// Move the caret (clamped). The selection is left alone.
    pub fn set_cursor_position(&mut self, pos: CursorPosition) {
        self.cursor = pos.clamped(&self.buffer);
    }

    /// Select from `start` to `end` (both clamped); the caret follows `end`.
    pub fn set_selection(&mut self, start: CursorPosition, end: CursorPosition) {
        let (start, end) = (start.clamped(&self.buffer), end.clamped(&self.buffer));
        self.selection.set(start, end);
        self.cursor = end;
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select the whole document.
    pub fn select_all(&mut self) {
        self.set_selection(
            CursorPosition::document_start(),
            CursorPosition::document_end(&self.buffer),
        );
    }

    /// Select the text of line `line`.
    pub fn select_line(&mut self, line: usize) {
        let line = self.buffer.clamp_line(line);
        self.set_selection(
            CursorPosition::new(line, 0),
            CursorPosition::new(line, self.buffer.line_len(line)),
        );
    }

    /// Move the caret. With `extend`, the selection grows from its anchor (or from the old
    /// caret) to the new position; otherwise the selection is dropped.
    pub fn move_cursor(&mut self, movement: Movement, extend: bool) -> CursorPosition {
        let next = self.cursor.moved(movement, &self.buffer);
        if extend {
            let anchor = self.selection.get().map_or(self.cursor, |s| s.start);
            self.selection.set(anchor, next);
        } else {
            self.selection.clear();
        }
        self.cursor = next;
        next
    }

    /// Open an undo group: edits until the matching [`end_undo_group`](Self::end_undo_group)
    /// undo as one step.
    pub fn begin_undo_group(&mut self) {
        self.history.begin_group();
    }

    /// Close the innermost undo group.
    pub fn end_undo_group(&mut self) {
        self.history.end_group();
    }

    /// Whether the document matches the last clean point.
    pub fn is_clean(&self) -> bool {
        self.history.is_clean()
    }

    /// Mark the current state as clean (e.g. after saving).
    pub fn mark_clean(&mut self) {
        self.history.mark_clean();
    }

    /// The line ending used for joining.
    pub fn line_ending(&self) -> LineEnding {
        self.config.line_ending
    }

    /// Switch the line ending. Stored undo snapshots are converted.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.config.line_ending = line_ending;
        self.history.set_line_ending(line_ending);
    }

    /// Install or remove the auto-pair hook.
    pub fn set_auto_pair_hook(&mut self, hook: Option<AutoPairHook>) {
        self.auto_pair = hook;
    }

    // Search

    /// Select the next occurrence of `query` after the caret, wrapping to the top once.
    pub fn find_next(
        &mut self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Option<SearchMatch>, SearchError> {
        let from = self
            .selection
            .effective()
            .map_or(self.cursor, |s| s.ordered().end());
        let mut found = search::find_next(&self.buffer, query, options, from)?;
        if found.is_none() && from != CursorPosition::document_start() {
            trace!("find_next wrapped to document start");
            found = search::find_next(
                &self.buffer,
                query,
                options,
                CursorPosition::document_start(),
            )?;
        }
        if let Some(m) = found {
            self.select_match(m);
        }
        Ok(found)
    }

    /// Select the previous occurrence of `query` before the caret, wrapping to the bottom once.
    pub fn find_prev(
        &mut self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Option<SearchMatch>, SearchError> {
        let from = self
            .selection
            .effective()
            .map_or(self.cursor, |s| s.ordered().start());
        let end = CursorPosition::document_end(&self.buffer);
        let mut found = search::find_prev(&self.buffer, query, options, from)?;
        if found.is_none() && from != end {
            trace!("find_prev wrapped to document end");
            found = search::find_prev(&self.buffer, query, options, end)?;
        }
        if let Some(m) = found {
            self.select_match(m);
        }
        Ok(found)
    }

    /// All occurrences of `query`.
    pub fn find_all(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchMatch>, SearchError> {
        search::find_all(&self.buffer, query, options)
    }

    /// Replace every occurrence of `query` as a single undoable edit. Returns the number of
    /// replacements.
    pub fn replace_all(
        &mut self,
        query: &str,
        options: SearchOptions,
        replacement: &str,
    ) -> Result<usize, CommandError> {
        if query.is_empty() {
            return Err(CommandError::EmptyQuery);
        }
        let Some(result) = search::replace_all(&self.buffer, query, options, replacement)? else {
            return Ok(0);
        };

        debug!(
            start_line = result.start_line,
            lines = result.line_count,
            replacements = result.replacements,
            "replace all"
        );
        let cursor = self.cursor;
        let pos = self.engine().replace_lines(
            result.start_line,
            result.line_count,
            result.lines,
            cursor,
        )?;
        self.finish_edit(pos);
        Ok(result.replacements)
    }

    fn select_match(&mut self, m: SearchMatch) {
        let selection = m.selection();
        self.selection.set(selection.start, selection.end);
        self.cursor = selection.end;
    }

    fn engine(&mut self) -> EditEngine<'_> {
        EditEngine::new(&mut self.buffer, &mut self.history, &mut self.longest)
    }

    fn finish_edit(&mut self, pos: CursorPosition) -> CursorPosition {
        self.cursor = pos.clamped(&self.buffer);
        self.selection.clear();
        self.cursor
    }

    fn restore_caret(&mut self, restore: CaretState) {
        self.longest.invalidate();
        if let Some(cursor) = restore.cursor {
            self.cursor = cursor.clamped(&self.buffer);
        }
        self.selection
            .replace(restore.selection.map(|s| s.clamped(&self.buffer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(lines: &[&str]) -> EditorSession {
        let mut session = EditorSession::new();
        session.load_lines(lines.iter().map(|s| s.to_string()).collect());
        session
    }

    fn pos(line: usize, character: usize) -> CursorPosition {
        CursorPosition::new(line, character)
    }

    #[test]
    fn typing_replaces_selection_and_clears_it() {
        let mut s = session(&["hello world"]);
        s.set_selection(pos(0, 6), pos(0, 11));
        s.insert_text("there").unwrap();
        assert_eq!(s.text(), "hello there");
        assert!(s.selection().is_none());
        assert_eq!(s.cursor_position(), pos(0, 11));
    }

    #[test]
    fn undo_restores_selection_and_caret() {
        let mut s = session(&["abc", "def"]);
        s.set_selection(pos(0, 1), pos(1, 1));
        s.insert_text("Z").unwrap();
        assert_eq!(s.text(), "aZef");
        assert!(s.undo());
        assert_eq!(s.text(), "abc\ndef");
        assert_eq!(
            s.selection(),
            Some(TextSelection::new(pos(0, 1), pos(1, 1)))
        );
        assert_eq!(s.cursor_position(), pos(1, 1));
        assert!(s.redo());
        assert_eq!(s.cursor_position(), pos(0, 2));
        assert!(s.selection().is_none());
    }

    #[test]
    fn auto_pair_hook_only_applies_to_single_characters() {
        let mut s = EditorSession::new();
        s.set_auto_pair_hook(Some(Box::new(|text: &str| match text {
            "(" => "()".to_string(),
            other => other.to_string(),
        })));
        s.insert_text("(").unwrap();
        s.insert_text("((").unwrap();
        assert_eq!(s.text(), "()((");
    }

    #[test]
    fn auto_pair_hook_skips_line_breaks() {
        let mut s = session(&["ab"]);
        s.set_auto_pair_hook(Some(Box::new(|text: &str| format!("{text}{text}"))));
        s.set_cursor_position(pos(0, 1));
        s.insert_text("\n").unwrap();
        s.insert_text("\r").unwrap();
        assert_eq!(s.buffer().lines(), ["a", "", "b"]);
        assert_eq!(s.cursor_position(), pos(2, 0));

        s.insert_text("x").unwrap();
        assert_eq!(s.line_text(2), "xxb");
    }

    #[test]
    fn load_lines_splits_embedded_breaks_and_clears_history() {
        let mut s = session(&["x"]);
        s.insert_text("y").unwrap();
        s.load_lines(vec!["a\nb".to_string(), "c".to_string()]);
        assert_eq!(s.line_count(), 3);
        assert!(!s.can_undo());
        assert_eq!(s.cursor_position(), pos(0, 0));
    }

    #[test]
    fn load_text_adopts_line_ending() {
        let s = EditorSession::from_text("a\r\nb");
        assert_eq!(s.line_ending(), LineEnding::Crlf);
        assert_eq!(s.text(), "a\r\nb");
    }

    #[test]
    fn move_cursor_with_extend_grows_selection() {
        let mut s = session(&["one two"]);
        s.move_cursor(Movement::WordRight, true);
        assert_eq!(s.selected_text().as_deref(), Some("one "));
        s.move_cursor(Movement::LineEnd, false);
        assert!(s.selection().is_none());
        assert_eq!(s.cursor_position(), pos(0, 7));
    }

    #[test]
    fn grouped_edits_undo_together() {
        let mut s = session(&[""]);
        s.begin_undo_group();
        s.insert_text("a").unwrap();
        s.insert_text("b").unwrap();
        s.insert_new_line().unwrap();
        s.end_undo_group();
        assert_eq!(s.text(), "ab\n");
        assert!(s.undo());
        assert_eq!(s.text(), "");
        assert!(!s.can_undo());
    }

    #[test]
    fn find_next_wraps_and_selects() {
        let mut s = session(&["foo", "bar foo"]);
        s.set_cursor_position(pos(1, 5));
        let m = s.find_next("foo", SearchOptions::default()).unwrap().unwrap();
        assert_eq!((m.line, m.start), (0, 0));
        assert_eq!(s.selected_text().as_deref(), Some("foo"));
        let m = s.find_next("foo", SearchOptions::default()).unwrap().unwrap();
        assert_eq!((m.line, m.start), (1, 4));
    }

    #[test]
    fn replace_all_is_one_undo_step() {
        let mut s = session(&["a-a", "b", "a"]);
        let count = s.replace_all("a", SearchOptions::default(), "x").unwrap();
        assert_eq!(count, 3);
        assert_eq!(s.text(), "x-x\nb\nx");
        assert_eq!(s.undo_depth(), 1);
        s.undo();
        assert_eq!(s.text(), "a-a\nb\na");
    }

    #[test]
    fn replace_all_rejects_empty_query() {
        let mut s = session(&["a"]);
        assert!(matches!(
            s.replace_all("", SearchOptions::default(), "x"),
            Err(CommandError::EmptyQuery)
        ));
    }

    #[test]
    fn clean_point_tracks_history() {
        let mut s = session(&["a"]);
        assert!(s.is_clean());
        s.insert_text("b").unwrap();
        assert!(!s.is_clean());
        s.mark_clean();
        s.undo();
        assert!(!s.is_clean());
        s.redo();
        assert!(s.is_clean());
    }

    #[test]
    fn longest_line_is_recomputed_after_undo() {
        let mut s = session(&["ab", "abcd"]);
        assert_eq!(s.longest_line().line, 1);
        s.set_cursor_position(pos(0, 2));
        s.insert_text("xxxxx").unwrap();
        assert_eq!(s.longest_line().line, 0);
        s.undo();
        assert_eq!(s.longest_line().line, 1);
    }
}
