//! The edit engine.
//!
//! [`EditEngine`] borrows the three pieces of session state a mutation touches (the line
//! buffer, the undo history and the longest-line cache) for the duration of one operation.
//! Every operation reduces to "replace lines `[start, start + k)` with these new lines", which
//! is recorded in the [`UndoRedoManager`] so it is always undoable.
//!
//! Positions and selections passed in are clamped to the buffer first. No operation reports
//! a range error. Inserting operations allocate everything up front (the composed lines, room
//! in the line storage and both history snapshots) and only then touch the document, so the
//! only failure, [`EditError::OutOfMemory`], leaves it unchanged. Removals shrink the document
//! and go through [`UndoRedoManager::record_and_run`].

use crate::cursor::{CursorPosition, steps_to_move_left, steps_to_move_right};
use crate::error::EditError;
use crate::history::{CaretState, EditSpan, PreparedSplice, UndoRedoManager};
use crate::line_buffer::LineBuffer;
use crate::line_ending::split_lines;
use crate::longest_line::{LongestLineCache, line_width};
use crate::selection::TextSelection;
use crate::text::{char_len, char_slice, split_at_char, splice_chars};
use std::collections::TryReserveError;
use tracing::{debug, trace, warn};

/// Inserts producing more lines than this are logged at debug level.
const LARGE_EDIT_LINES: usize = 10_000;

/// How a replacement relates to the selection it replaces. Only used for diagnostics: all
/// shapes compose their result as `prefix + fragments + suffix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplaceShape {
    SingleLine,
    WholeText,
    MultiLine {
        start_covered: bool,
        end_covered: bool,
    },
}

impl ReplaceShape {
    fn classify(selection: &TextSelection, buffer: &LineBuffer) -> Self {
        let ordered = selection.ordered();
        if ordered.start_line == ordered.end_line {
            Self::SingleLine
        } else if selection.is_whole_text(buffer) {
            Self::WholeText
        } else {
            Self::MultiLine {
                start_covered: ordered.start_character == 0,
                end_covered: ordered.end_character == buffer.line_len(ordered.end_line),
            }
        }
    }
}

/// Build the replacement lines for a span whose first line keeps `prefix` and whose last line
/// keeps `suffix`.
fn try_compose_lines(
    prefix: &str,
    fragments: &[&str],
    suffix: &str,
) -> Result<Vec<String>, TryReserveError> {
    let last = fragments.len().saturating_sub(1);
    let mut lines = Vec::new();
    lines.try_reserve_exact(fragments.len())?;
    for (idx, fragment) in fragments.iter().enumerate() {
        let head = if idx == 0 { prefix } else { "" };
        let tail = if idx == last { suffix } else { "" };
        let mut line = String::new();
        line.try_reserve_exact(head.len() + fragment.len() + tail.len())?;
        line.push_str(head);
        line.push_str(fragment);
        line.push_str(tail);
        lines.push(line);
    }
    Ok(lines)
}

/// What an inserting edit allocated before it touches the document.
struct PreparedEdit {
    lines: Vec<String>,
    widths: Vec<usize>,
    splice: PreparedSplice,
}

/// Performs undoable mutations on a document.
#[derive(Debug)]
pub struct EditEngine<'a> {
    buffer: &'a mut LineBuffer,
    history: &'a mut UndoRedoManager,
    longest: &'a mut LongestLineCache,
}

impl<'a> EditEngine<'a> {
    /// Borrow the state one edit operates on.
    pub fn new(
        buffer: &'a mut LineBuffer,
        history: &'a mut UndoRedoManager,
        longest: &'a mut LongestLineCache,
    ) -> Self {
        Self {
            buffer,
            history,
            longest,
        }
    }

    /// Insert `text` at `cursor`, or over `selection` if it is effective.
    ///
    /// Line breaks in `text` (`\n`, `\r`, `\r\n`) split the current line. Returns the caret
    /// after the inserted text. Empty text is a no-op and records nothing.
    pub fn insert_text(
        &mut self,
        text: &str,
        selection: Option<TextSelection>,
        cursor: CursorPosition,
    ) -> Result<CursorPosition, EditError> {
        if let Some(selection) = selection.filter(TextSelection::has_selection) {
            return self.replace(text, selection);
        }

        let pos = cursor.clamped(self.buffer);
        if text.is_empty() {
            return Ok(pos);
        }

        let fragments = split_lines(text);
        let n = fragments.len();
        let last_len = fragments.last().map_or(0, |f| char_len(f));
        let cursor_after = if n == 1 {
            CursorPosition::new(pos.line, pos.character + last_len)
        } else {
            CursorPosition::new(pos.line + n - 1, last_len)
        };

        trace!(line = pos.line, fragments = n, "insert text");
        self.splice(
            pos.line,
            1,
            |buffer| {
                let (before, after) = split_at_char(buffer.line(pos.line), pos.character);
                try_compose_lines(before, &fragments, after)
            },
            CaretState::new(pos, selection),
            cursor_after,
        )
    }

    /// Replace the text covered by `selection` with `text`.
    ///
    /// Empty text removes the selection; a selection that collapses after clamping becomes a
    /// plain insert at that position.
    pub fn replace(
        &mut self,
        text: &str,
        selection: TextSelection,
    ) -> Result<CursorPosition, EditError> {
        if text.is_empty() {
            return Ok(self.remove(selection));
        }

        let selection = selection.clamped(self.buffer);
        let ordered = selection.ordered();
        if ordered.is_empty() {
            return self.insert_text(text, None, ordered.start());
        }

        let shape = ReplaceShape::classify(&selection, self.buffer);
        let fragments = split_lines(text);
        let suffix_len = self.buffer.line_len(ordered.end_line) - ordered.end_character;

        let n = fragments.len();
        let last_len = fragments.last().map_or(0, |f| char_len(f));
        let cursor_after = if n == 1 {
            CursorPosition::new(ordered.start_line, ordered.start_character + last_len)
        } else {
            CursorPosition::new(ordered.start_line + n - 1, last_len + suffix_len)
        };

        trace!(?shape, start_line = ordered.start_line, fragments = n, "replace");
        self.splice(
            ordered.start_line,
            ordered.line_span(),
            |buffer| {
                let first = buffer.line(ordered.start_line);
                let last = buffer.line(ordered.end_line);
                let prefix = char_slice(first, 0, ordered.start_character);
                let suffix = char_slice(last, ordered.end_character, usize::MAX);
                try_compose_lines(prefix, &fragments, suffix)
            },
            CaretState::new(selection.end, Some(selection)),
            cursor_after,
        )
    }

    /// Delete the text covered by `selection`, merging the remainders of its boundary lines.
    ///
    /// Returns the ordered start of the selection. A selection without extent is a no-op.
    pub fn remove(&mut self, selection: TextSelection) -> CursorPosition {
        let selection = selection.clamped(self.buffer);
        let ordered = selection.ordered();
        if ordered.is_empty() {
            return ordered.start();
        }

        let prefix = char_slice(
            self.buffer.line(ordered.start_line),
            0,
            ordered.start_character,
        );
        let suffix = char_slice(
            self.buffer.line(ordered.end_line),
            ordered.end_character,
            usize::MAX,
        );
        let merged = format!("{prefix}{suffix}");

        trace!(
            start_line = ordered.start_line,
            lines = ordered.line_span(),
            "remove selection"
        );
        self.commit(
            ordered.start_line,
            ordered.line_span(),
            vec![merged],
            CaretState::new(selection.end, Some(selection)),
            ordered.start(),
        )
    }

    /// Delete backwards from `cursor`: one grapheme cluster, or one word run in word mode.
    ///
    /// At the start of a line the line is merged onto the previous one; on the first line
    /// that is a no-op.
    pub fn backspace(&mut self, cursor: CursorPosition, word_mode: bool) -> CursorPosition {
        let pos = cursor.clamped(self.buffer);

        if pos.character == 0 {
            if pos.line == 0 {
                return pos;
            }
            let prev = pos.line - 1;
            let prev_text = self.buffer.line(prev);
            let joined = format!("{prev_text}{}", self.buffer.line(pos.line));
            let cursor_after = CursorPosition::new(prev, char_len(prev_text));
            return self.commit(
                prev,
                2,
                vec![joined],
                CaretState::new(pos, None),
                cursor_after,
            );
        }

        let line = self.buffer.line(pos.line);
        let steps = steps_to_move_left(line, pos.character, word_mode);
        let start = pos.character - steps;
        let updated = splice_chars(line, start, pos.character, "");
        self.commit(
            pos.line,
            1,
            vec![updated],
            CaretState::new(pos, None),
            CursorPosition::new(pos.line, start),
        )
    }

    /// Delete forwards from `cursor`: one grapheme cluster, or one word run in word mode.
    ///
    /// At the end of a line the next line is merged onto it; on the last line that is a
    /// no-op.
    pub fn forward_delete(&mut self, cursor: CursorPosition, word_mode: bool) -> CursorPosition {
        let pos = cursor.clamped(self.buffer);
        let line = self.buffer.line(pos.line);

        if pos.character >= char_len(line) {
            if pos.line >= self.buffer.last_line_index() {
                return pos;
            }
            let joined = format!("{line}{}", self.buffer.line(pos.line + 1));
            return self.commit(pos.line, 2, vec![joined], CaretState::new(pos, None), pos);
        }

        let steps = steps_to_move_right(line, pos.character, word_mode);
        let updated = splice_chars(line, pos.character, pos.character + steps, "");
        self.commit(pos.line, 1, vec![updated], CaretState::new(pos, None), pos)
    }

    /// Split the line at `cursor` (or replace `selection`) with a line break.
    pub fn insert_new_line(
        &mut self,
        selection: Option<TextSelection>,
        cursor: CursorPosition,
    ) -> Result<CursorPosition, EditError> {
        let marker = self.history.line_ending().as_str();
        self.insert_text(marker, selection, cursor)
    }

    /// Remove line `line` entirely. The only line of a buffer is emptied instead.
    ///
    /// The caret stays on the same line index (clamped to the shorter buffer) and keeps its
    /// character column where the new line is long enough.
    pub fn delete_line(&mut self, line: usize, cursor: CursorPosition) -> CursorPosition {
        let line = self.buffer.clamp_line(line);
        let before = CaretState::new(cursor.clamped(self.buffer), None);

        if self.buffer.line_count() == 1 {
            return self.commit(
                0,
                1,
                vec![String::new()],
                before,
                CursorPosition::document_start(),
            );
        }

        let (target, next_text) = if line < self.buffer.last_line_index() {
            (line, self.buffer.line(line + 1))
        } else {
            (line - 1, self.buffer.line(line - 1))
        };
        let cursor_after = CursorPosition::new(target, cursor.character.min(char_len(next_text)));
        self.commit(line, 1, Vec::new(), before, cursor_after)
    }

    /// Replace `count` whole lines at `start` with `lines` as one undoable step.
    ///
    /// `lines` must not contain line breaks. The caret ends up at the end of the last inserted
    /// line, or at the start of the line that took the removed span's place.
    pub fn replace_lines(
        &mut self,
        start: usize,
        count: usize,
        mut lines: Vec<String>,
        cursor: CursorPosition,
    ) -> Result<CursorPosition, EditError> {
        let start = start.min(self.buffer.line_count());
        let count = count.min(self.buffer.line_count() - start);
        if lines.is_empty() && count == self.buffer.line_count() {
            lines.push(String::new());
        }

        let cursor_after = match lines.last() {
            Some(last) => CursorPosition::new(start + lines.len() - 1, char_len(last)),
            None => {
                let remaining = self.buffer.line_count() - count;
                CursorPosition::new(start.min(remaining.saturating_sub(1)), 0)
            }
        };

        self.splice(
            start,
            count,
            move |_| Ok(std::mem::take(&mut lines)),
            CaretState::new(cursor.clamped(self.buffer), None),
            cursor_after,
        )
    }

    /// Replace the whole document with `text` as one undoable step.
    ///
    /// The caret ends up at the end of the inserted text.
    pub fn replace_all_text(&mut self, text: &str) -> Result<CursorPosition, EditError> {
        let fragments = split_lines(text);
        let last_len = fragments.last().map_or(0, |f| char_len(f));
        let cursor_after = CursorPosition::new(fragments.len().saturating_sub(1), last_len);
        let count = self.buffer.line_count();
        self.splice(
            0,
            count,
            |_| try_compose_lines("", &fragments, ""),
            CaretState::new(CursorPosition::document_start(), None),
            cursor_after,
        )
    }

    /// Replace `remove_count` lines at `start_line` with the lines `compose` builds.
    ///
    /// Composition, room for the new lines and the history snapshots are all allocated
    /// before the document changes. `compose` may run twice if the first attempt fails.
    fn splice<C>(
        &mut self,
        start_line: usize,
        remove_count: usize,
        mut compose: C,
        before: CaretState,
        cursor_after: CursorPosition,
    ) -> Result<CursorPosition, EditError>
    where
        C: FnMut(&LineBuffer) -> Result<Vec<String>, TryReserveError>,
    {
        let mut composed: Option<Vec<String>> = None;
        let prepared = self.with_one_retry(|engine| {
            let lines = match composed.take() {
                Some(lines) => lines,
                None => compose(&*engine.buffer)?,
            };
            match engine.prepare(start_line, remove_count, &lines) {
                Ok((widths, splice)) => Ok(PreparedEdit {
                    lines,
                    widths,
                    splice,
                }),
                Err(err) => {
                    composed = Some(lines);
                    Err(err)
                }
            }
        })?;

        if prepared.lines.len() > LARGE_EDIT_LINES {
            debug!(
                start_line,
                removed = remove_count,
                inserted = prepared.lines.len(),
                "large edit"
            );
        }

        let cursor = self.history.record_prepared(
            self.buffer,
            prepared.splice,
            prepared.lines,
            before,
            cursor_after,
        );
        self.longest
            .on_lines_replaced(start_line, remove_count, &prepared.widths);
        Ok(cursor)
    }

    /// Allocate room for `lines` in the buffer, their widths and the history record.
    fn prepare(
        &mut self,
        start_line: usize,
        remove_count: usize,
        lines: &[String],
    ) -> Result<(Vec<usize>, PreparedSplice), TryReserveError> {
        self.buffer
            .try_reserve(lines.len().saturating_sub(remove_count))?;
        let mut widths = Vec::new();
        widths.try_reserve_exact(lines.len())?;
        widths.extend(lines.iter().map(|line| line_width(line)));
        let splice = self
            .history
            .try_prepare_splice(self.buffer, start_line, remove_count, lines)?;
        Ok((widths, splice))
    }

    /// Record and apply a splice that never grows the line count, such as a removal.
    fn commit(
        &mut self,
        start_line: usize,
        remove_count: usize,
        lines: Vec<String>,
        before: CaretState,
        cursor_after: CursorPosition,
    ) -> CursorPosition {
        let widths: Vec<usize> = lines.iter().map(|line| line_width(line)).collect();
        let span = EditSpan::new(start_line, remove_count, lines.len());

        let cursor = self
            .history
            .record_and_run(self.buffer, span, before, move |buffer| {
                let mut lines = lines;
                match (remove_count, lines.len()) {
                    (1, 1) => {
                        if let Some(line) = lines.pop() {
                            buffer.set_line(start_line, line);
                        }
                    }
                    _ => buffer.replace_range(start_line, remove_count, lines),
                }
                cursor_after
            });

        self.longest
            .on_lines_replaced(start_line, remove_count, &widths);
        cursor
    }

    /// Run `attempt`, and once more after releasing spare memory if it fails.
    fn with_one_retry<T, F>(&mut self, mut attempt: F) -> Result<T, EditError>
    where
        F: FnMut(&mut Self) -> Result<T, TryReserveError>,
    {
        match attempt(self) {
            Ok(value) => return Ok(value),
            Err(err) => warn!(
                error = %err,
                "allocation for edit failed, releasing caches and retrying"
            ),
        }

        self.longest.invalidate();
        self.buffer.shrink_to_fit();
        self.history.shrink_to_fit();
        attempt(self).map_err(|source| EditError::OutOfMemory { source })
    }
}
