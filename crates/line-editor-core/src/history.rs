//! Undo/redo history.
//!
//! Every mutation is recorded as a before/after snapshot of the line range it touched: the
//! affected lines are joined with the session's line ending before the mutation runs
//! (`undo_text`) and again afterwards (`redo_text`). Undo swaps the after-lines for the
//! before-lines, redo does the reverse. This keeps records trivially exact at the cost of
//! memory proportional to the edited span.
//!
//! # Redo invalidation
//!
//! Recording any new mutation clears the redo stack immediately. Undo and redo themselves
//! never clear it.
//!
//! # Grouping
//!
//! [`UndoRedoManager::begin_group`] / [`UndoRedoManager::end_group`] bracket several
//! records into one user-visible step. Inside a bracket, every record after the first carries
//! `continues_group = true`; undo keeps popping while the popped item continues a group, redo
//! keeps popping while the next item does. Brackets nest; only the outermost one counts.

use crate::cursor::CursorPosition;
use crate::line_buffer::LineBuffer;
use crate::line_ending::LineEnding;
use crate::selection::TextSelection;
use std::collections::TryReserveError;
use tracing::{debug, trace};

/// Default number of history items kept before the oldest groups are dropped.
pub const DEFAULT_MAX_UNDO_DEPTH: usize = 1000;

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRedoItem {
    /// First line of the affected range.
    pub start_line: usize,
    /// The range before the mutation, joined with the line ending.
    pub undo_text: String,
    /// The range after the mutation, joined with the line ending.
    pub redo_text: String,
    /// Number of lines in `undo_text`.
    pub undo_line_count: usize,
    /// Number of lines in `redo_text`.
    pub redo_line_count: usize,
    /// Selection before the mutation.
    pub selection_before: Option<TextSelection>,
    /// Selection after the mutation.
    pub selection_after: Option<TextSelection>,
    /// Caret before the mutation.
    pub cursor_before: Option<CursorPosition>,
    /// Caret after the mutation.
    pub cursor_after: Option<CursorPosition>,
    /// `true` for every item of a group except the first.
    pub continues_group: bool,
}

/// The line range a mutation touches, before and after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSpan {
    /// First affected line.
    pub start_line: usize,
    /// Lines occupied by the range before the mutation.
    pub before_line_count: usize,
    /// Lines occupied by the range after the mutation.
    pub after_line_count: usize,
}

impl EditSpan {
    /// Create a span.
    pub fn new(start_line: usize, before_line_count: usize, after_line_count: usize) -> Self {
        Self {
            start_line,
            before_line_count,
            after_line_count,
        }
    }

    /// A 1:1 edit of a single line.
    pub fn single_line(line: usize) -> Self {
        Self::new(line, 1, 1)
    }
}

/// Snapshot texts for one splice, allocated before the buffer changes.
#[derive(Debug)]
pub struct PreparedSplice {
    span: EditSpan,
    undo_text: String,
    redo_text: String,
}

/// Caret and selection recorded around a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretState {
    /// Caret position, if recorded.
    pub cursor: Option<CursorPosition>,
    /// Selection, if any.
    pub selection: Option<TextSelection>,
}

impl CaretState {
    /// Caret plus optional selection.
    pub fn new(cursor: CursorPosition, selection: Option<TextSelection>) -> Self {
        Self {
            cursor: Some(cursor),
            selection,
        }
    }
}

/// Two-stack undo/redo history with grouping and a clean point.
#[derive(Debug)]
pub struct UndoRedoManager {
    undo_stack: Vec<UndoRedoItem>,
    redo_stack: Vec<UndoRedoItem>,
    line_ending: LineEnding,
    max_depth: usize,
    group_depth: usize,
    group_has_items: bool,
    /// Clean point as an `undo_stack.len()`. May point into the redo area; becomes `None`
    /// once that area is discarded.
    clean_index: Option<usize>,
    /// Bumped by every record, undo, redo and reset.
    revision: u64,
}

impl UndoRedoManager {
    /// Create an empty history that joins snapshots with `line_ending`.
    pub fn new(line_ending: LineEnding, max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            line_ending,
            max_depth: max_depth.max(1),
            group_depth: 0,
            group_has_items: false,
            clean_index: Some(0),
            revision: 0,
        }
    }

    /// Can undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Can redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Items on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Items on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Counter that changes whenever the history changes the document.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Most recent undo item.
    pub fn last_item(&self) -> Option<&UndoRedoItem> {
        self.undo_stack.last()
    }

    /// Line ending used for snapshots.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Switch the snapshot line ending, rewriting every stored snapshot.
    ///
    /// Lines never contain line-break characters, so the old marker can be replaced textually.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        if line_ending == self.line_ending {
            return;
        }
        let (old, new) = (self.line_ending.as_str(), line_ending.as_str());
        for item in self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut()) {
            if item.undo_line_count > 1 {
                item.undo_text = item.undo_text.replace(old, new);
            }
            if item.redo_line_count > 1 {
                item.redo_text = item.redo_text.replace(old, new);
            }
        }
        self.line_ending = line_ending;
    }

    /// Maximum number of items kept.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the maximum depth, dropping the oldest groups if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        self.trim_to_depth();
    }

    /// Open a group. Nested calls only count the outermost bracket.
    pub fn begin_group(&mut self) {
        if self.group_depth == 0 {
            self.group_has_items = false;
        }
        self.group_depth += 1;
    }

    /// Close the innermost open group.
    pub fn end_group(&mut self) {
        self.group_depth = self.group_depth.saturating_sub(1);
        if self.group_depth == 0 {
            self.group_has_items = false;
        }
    }

    /// `true` while a group bracket is open.
    pub fn is_grouping(&self) -> bool {
        self.group_depth > 0
    }

    /// Whether the document matches the last clean point.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo_stack.len())
    }

    /// Mark the current state as clean (e.g. after saving).
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
    }

    /// Drop all history and reset the clean point.
    pub fn clear_all(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group_depth = 0;
        self.group_has_items = false;
        self.clean_index = Some(0);
        self.revision += 1;
    }

    /// Snapshot `span` before and after running `action` on `buffer`, and push the record.
    ///
    /// `action` performs the mutation and returns the caret after it. The item stores that
    /// caret with no selection, since every edit collapses the selection.
    pub fn record_and_run<F>(
        &mut self,
        buffer: &mut LineBuffer,
        span: EditSpan,
        before: CaretState,
        action: F,
    ) -> CursorPosition
    where
        F: FnOnce(&mut LineBuffer) -> CursorPosition,
    {
        let single_line = span.before_line_count == 1 && span.after_line_count == 1;

        let undo_text = if single_line {
            buffer.line(span.start_line).to_string()
        } else {
            self.snapshot(buffer, span.start_line, span.before_line_count)
        };

        let cursor_after = action(buffer);

        let redo_text = if single_line {
            buffer.line(span.start_line).to_string()
        } else {
            self.snapshot(buffer, span.start_line, span.after_line_count)
        };

        trace!(
            start_line = span.start_line,
            before = span.before_line_count,
            after = span.after_line_count,
            "recorded edit"
        );

        self.push(UndoRedoItem {
            start_line: span.start_line,
            undo_text,
            redo_text,
            undo_line_count: span.before_line_count,
            redo_line_count: span.after_line_count,
            selection_before: before.selection,
            selection_after: None,
            cursor_before: before.cursor,
            cursor_after: Some(cursor_after),
            continues_group: false,
        });

        cursor_after
    }

    /// Allocate everything recording a splice of `lines` over `remove_count` lines at
    /// `start_line` will need, without touching the buffer or the stacks.
    ///
    /// Pair with [`UndoRedoManager::record_prepared`]. Fails only if an allocation fails.
    pub fn try_prepare_splice(
        &mut self,
        buffer: &LineBuffer,
        start_line: usize,
        remove_count: usize,
        lines: &[String],
    ) -> Result<PreparedSplice, TryReserveError> {
        let separator = self.line_ending.as_str();
        let removed = buffer.lines().iter().skip(start_line).take(remove_count);
        let undo_text = try_join(removed.map(String::as_str), separator)?;
        let redo_text = try_join(lines.iter().map(String::as_str), separator)?;
        self.undo_stack.try_reserve(1)?;
        Ok(PreparedSplice {
            span: EditSpan::new(start_line, remove_count, lines.len()),
            undo_text,
            redo_text,
        })
    }

    /// Apply a splice prepared by [`UndoRedoManager::try_prepare_splice`] and push its record.
    ///
    /// `lines` must be the lines the splice was prepared with.
    pub fn record_prepared(
        &mut self,
        buffer: &mut LineBuffer,
        prepared: PreparedSplice,
        mut lines: Vec<String>,
        before: CaretState,
        cursor_after: CursorPosition,
    ) -> CursorPosition {
        let PreparedSplice {
            span,
            undo_text,
            redo_text,
        } = prepared;
        match (span.before_line_count, lines.len()) {
            (1, 1) => {
                if let Some(line) = lines.pop() {
                    buffer.set_line(span.start_line, line);
                }
            }
            _ => buffer.replace_range(span.start_line, span.before_line_count, lines),
        }

        trace!(
            start_line = span.start_line,
            before = span.before_line_count,
            after = span.after_line_count,
            "recorded prepared edit"
        );

        self.push(UndoRedoItem {
            start_line: span.start_line,
            undo_text,
            redo_text,
            undo_line_count: span.before_line_count,
            redo_line_count: span.after_line_count,
            selection_before: before.selection,
            selection_after: None,
            cursor_before: before.cursor,
            cursor_after: Some(cursor_after),
            continues_group: false,
        });

        cursor_after
    }

    /// Release spare capacity held by both stacks.
    pub fn shrink_to_fit(&mut self) {
        self.undo_stack.shrink_to_fit();
        self.redo_stack.shrink_to_fit();
    }

    /// Undo the most recent group. Returns the caret state recorded before it, or `None` if
    /// there was nothing to undo.
    pub fn undo(&mut self, buffer: &mut LineBuffer) -> Option<CaretState> {
        self.close_open_groups();

        let mut restore = None;
        let mut applied = 0usize;
        while let Some(item) = self.undo_stack.pop() {
            self.apply(
                buffer,
                item.start_line,
                item.redo_line_count,
                &item.undo_text,
                item.undo_line_count,
            );
            restore = Some(CaretState {
                cursor: item.cursor_before,
                selection: item.selection_before,
            });
            applied += 1;
            let continues = item.continues_group;
            self.redo_stack.push(item);
            if !continues {
                break;
            }
        }

        if applied > 0 {
            self.revision += 1;
            debug!(items = applied, "undo");
        }
        restore
    }

    /// Redo the most recently undone group. Returns the caret state recorded after it, or
    /// `None` if there was nothing to redo.
    pub fn redo(&mut self, buffer: &mut LineBuffer) -> Option<CaretState> {
        self.close_open_groups();

        let first = self.redo_stack.pop()?;
        let mut restore = self.redo_item(buffer, first);
        let mut applied = 1usize;
        while self
            .redo_stack
            .last()
            .is_some_and(|item| item.continues_group)
        {
            let Some(item) = self.redo_stack.pop() else {
                break;
            };
            restore = self.redo_item(buffer, item);
            applied += 1;
        }

        self.revision += 1;
        debug!(items = applied, "redo");
        Some(restore)
    }

    fn redo_item(&mut self, buffer: &mut LineBuffer, item: UndoRedoItem) -> CaretState {
        self.apply(
            buffer,
            item.start_line,
            item.undo_line_count,
            &item.redo_text,
            item.redo_line_count,
        );
        let restore = CaretState {
            cursor: item.cursor_after,
            selection: item.selection_after,
        };
        self.undo_stack.push(item);
        restore
    }

    fn apply(
        &self,
        buffer: &mut LineBuffer,
        start_line: usize,
        remove_count: usize,
        text: &str,
        insert_count: usize,
    ) {
        if remove_count == 1 && insert_count == 1 {
            buffer.set_line(start_line, text);
        } else {
            let lines = self.line_ending.split_joined(text, insert_count);
            buffer.replace_range(start_line, remove_count, lines);
        }
    }

    fn snapshot(&self, buffer: &LineBuffer, start_line: usize, count: usize) -> String {
        if count == 0 {
            String::new()
        } else {
            buffer.lines_as_string(start_line, count, self.line_ending)
        }
    }

    fn push(&mut self, mut item: UndoRedoItem) {
        self.clear_redo_and_adjust_clean();

        if self.group_depth > 0 {
            item.continues_group = self.group_has_items;
            self.group_has_items = true;
        }

        self.undo_stack.push(item);
        self.revision += 1;
        self.trim_to_depth();
    }

    fn close_open_groups(&mut self) {
        if self.group_depth > 0 {
            trace!(depth = self.group_depth, "closing open undo group");
            self.group_depth = 0;
            self.group_has_items = false;
        }
    }

    fn clear_redo_and_adjust_clean(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }

        // A clean point inside the redo area becomes unreachable.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.undo_stack.len()
        {
            self.clean_index = None;
        }

        self.redo_stack.clear();
    }

    fn trim_to_depth(&mut self) {
        let mut dropped = 0usize;
        while self.undo_stack.len() > self.max_depth {
            let group_len = 1 + self.undo_stack[1..]
                .iter()
                .take_while(|item| item.continues_group)
                .count();
            if group_len >= self.undo_stack.len() {
                break;
            }
            self.undo_stack.drain(..group_len);
            dropped += group_len;
        }

        if dropped == 0 {
            return;
        }
        self.clean_index = match self.clean_index {
            Some(idx) if idx >= dropped => Some(idx - dropped),
            _ => None,
        };
        debug!(
            dropped,
            remaining = self.undo_stack.len(),
            "trimmed undo history"
        );
    }
}

/// Join `parts` with `separator` into a string sized up front.
fn try_join<'s, I>(parts: I, separator: &str) -> Result<String, TryReserveError>
where
    I: Iterator<Item = &'s str> + Clone,
{
    let (count, bytes) = parts
        .clone()
        .fold((0usize, 0usize), |(count, bytes), part| {
            (count + 1, bytes + part.len())
        });
    let mut joined = String::new();
    joined.try_reserve_exact(bytes + separator.len() * count.saturating_sub(1))?;
    for (idx, part) in parts.enumerate() {
        if idx > 0 {
            joined.push_str(separator);
        }
        joined.push_str(part);
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn buffer(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    fn set_line(
        history: &mut UndoRedoManager,
        buf: &mut LineBuffer,
        line: usize,
        text: &'static str,
    ) {
        history.record_and_run(
            buf,
            EditSpan::single_line(line),
            CaretState::new(CursorPosition::new(line, 0), None),
            |b| {
                b.set_line(line, text);
                CursorPosition::new(line, text.len())
            },
        );
    }

    #[test]
    fn single_line_record_round_trips() {
        let mut buf = buffer(&["abc"]);
        let mut history = UndoRedoManager::new(LineEnding::Lf, 10);
        set_line(&mut history, &mut buf, 0, "abXc");

        let item = history.last_item().cloned().unwrap();
        assert_eq!(item.undo_text, "abc");
        assert_eq!(item.redo_text, "abXc");

        let restore = history.undo(&mut buf).unwrap();
        assert_eq!(buf.lines(), ["abc"]);
        assert_eq!(restore.cursor, Some(CursorPosition::new(0, 0)));

        let restore = history.redo(&mut buf).unwrap();
        assert_eq!(buf.lines(), ["abXc"]);
        assert_eq!(restore.cursor, Some(CursorPosition::new(0, 4)));
    }

    #[test]
    fn multi_line_record_uses_joined_text() {
        let mut buf = buffer(&["a", "b", "c"]);
        let mut history = UndoRedoManager::new(LineEnding::Crlf, 10);
        history.record_and_run(&mut buf, EditSpan::new(0, 2, 1), CaretState::default(), |b| {
            b.replace_range(0, 2, vec!["ab".to_string()]);
            CursorPosition::new(0, 1)
        });
        let item = history.last_item().unwrap();
        assert_eq!(item.undo_text, "a\r\nb");
        assert_eq!(item.redo_text, "ab");

        history.undo(&mut buf);
        assert_eq!(buf.lines(), ["a", "b", "c"]);
        history.redo(&mut buf);
        assert_eq!(buf.lines(), ["ab", "c"]);
    }

    #[test]
    fn zero_line_spans_insert_and_remove_whole_lines() {
        let mut buf = buffer(&["keep", "drop"]);
        let mut history = UndoRedoManager::new(LineEnding::Lf, 10);
        history.record_and_run(&mut buf, EditSpan::new(1, 1, 0), CaretState::default(), |b| {
            b.remove_range(1, 1);
            CursorPosition::new(0, 0)
        });
        assert_eq!(buf.lines(), ["keep"]);
        history.undo(&mut buf);
        assert_eq!(buf.lines(), ["keep", "drop"]);
    }

    #[test]
    fn prepared_splice_matches_record_and_run() {
        let mut prepared_buf = buffer(&["a", "b", "c"]);
        let mut direct_buf = prepared_buf.clone();
        let mut prepared_history = UndoRedoManager::new(LineEnding::Crlf, 10);
        let mut direct_history = UndoRedoManager::new(LineEnding::Crlf, 10);
        let lines = vec!["x".to_string(), "y".to_string(), "z".to_string()];

        let prepared = prepared_history
            .try_prepare_splice(&prepared_buf, 1, 2, &lines)
            .unwrap();
        assert_eq!(prepared_buf.lines(), ["a", "b", "c"]);
        prepared_history.record_prepared(
            &mut prepared_buf,
            prepared,
            lines.clone(),
            CaretState::default(),
            CursorPosition::new(3, 1),
        );
        direct_history.record_and_run(
            &mut direct_buf,
            EditSpan::new(1, 2, 3),
            CaretState::default(),
            |b| {
                b.replace_range(1, 2, lines);
                CursorPosition::new(3, 1)
            },
        );

        assert_eq!(prepared_buf.lines(), ["a", "x", "y", "z"]);
        assert_eq!(prepared_history.last_item(), direct_history.last_item());
        prepared_history.undo(&mut prepared_buf);
        assert_eq!(prepared_buf.lines(), ["a", "b", "c"]);
    }

    #[test]
    fn new_record_clears_redo() {
        let mut buf = buffer(&["x"]);
        let mut history = UndoRedoManager::new(LineEnding::Lf, 10);
        set_line(&mut history, &mut buf, 0, "y");
        history.undo(&mut buf);
        assert!(history.can_redo());
        set_line(&mut history, &mut buf, 0, "z");
        assert!(!history.can_redo());
    }

    #[test]
    fn groups_undo_and_redo_together() {
        let mut buf = buffer(&["0"]);
        let mut history = UndoRedoManager::new(LineEnding::Lf, 10);
        set_line(&mut history, &mut buf, 0, "1");
        history.begin_group();
        set_line(&mut history, &mut buf, 0, "2");
        history.begin_group();
        set_line(&mut history, &mut buf, 0, "3");
        history.end_group();
        set_line(&mut history, &mut buf, 0, "4");
        history.end_group();

        let flags: Vec<bool> = history.undo_stack.iter().map(|i| i.continues_group).collect();
        assert_eq!(flags, vec![false, false, true, true]);

        history.undo(&mut buf);
        assert_eq!(buf.line(0), "1");
        assert_eq!(history.redo_depth(), 3);
        history.undo(&mut buf);
        assert_eq!(buf.line(0), "0");

        history.redo(&mut buf);
        assert_eq!(buf.line(0), "1");
        history.redo(&mut buf);
        assert_eq!(buf.line(0), "4");
        assert!(!history.can_redo());
    }

    #[test]
    #[traced_test]
    fn depth_limit_drops_oldest_and_clean_point() {
        let mut buf = buffer(&["a"]);
        let mut history = UndoRedoManager::new(LineEnding::Lf, 2);
        assert!(history.is_clean());
        set_line(&mut history, &mut buf, 0, "b");
        set_line(&mut history, &mut buf, 0, "c");
        set_line(&mut history, &mut buf, 0, "d");
        assert_eq!(history.undo_depth(), 2);
        assert!(!history.is_clean());
        assert!(logs_contain("trimmed undo history"));
        history.undo(&mut buf);
        history.undo(&mut buf);
        assert_eq!(buf.line(0), "b");
        assert!(!history.can_undo());
    }

    #[test]
    fn clean_point_follows_undo_and_redo() {
        let mut buf = buffer(&["a"]);
        let mut history = UndoRedoManager::new(LineEnding::Lf, 10);
        set_line(&mut history, &mut buf, 0, "b");
        history.mark_clean();
        set_line(&mut history, &mut buf, 0, "c");
        assert!(!history.is_clean());
        history.undo(&mut buf);
        assert!(history.is_clean());
        history.undo(&mut buf);
        assert!(!history.is_clean());
        history.redo(&mut buf);
        assert!(history.is_clean());
    }

    #[test]
    fn switching_line_ending_rewrites_snapshots() {
        let mut buf = buffer(&["a", "b"]);
        let mut history = UndoRedoManager::new(LineEnding::Lf, 10);
        history.record_and_run(&mut buf, EditSpan::new(0, 2, 1), CaretState::default(), |b| {
            b.replace_range(0, 2, vec!["ab".to_string()]);
            CursorPosition::new(0, 1)
        });
        history.set_line_ending(LineEnding::Crlf);
        assert_eq!(history.last_item().unwrap().undo_text, "a\r\nb");
        history.undo(&mut buf);
        assert_eq!(buf.lines(), ["a", "b"]);
    }
}
