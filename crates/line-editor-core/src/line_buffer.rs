//! Line storage.
//!
//! [`LineBuffer`] is the single source of truth for document content: an index-addressable
//! `Vec<String>` with one entry per line and no line terminators. All index arguments are
//! clamped instead of rejected, so callers can pass arithmetic results such as
//! `line.saturating_sub(1)` or `line + 1` without guarding them first.

use crate::line_ending::LineEnding;
use std::collections::TryReserveError;
use std::ops::Range;
use tracing::debug;

/// Removing more lines than this in one call releases the freed capacity.
pub const DEFAULT_COMPACTION_THRESHOLD: usize = 1_000_000;

/// Ordered, never-empty sequence of text lines.
///
/// An empty document is one empty line. Every mutating method restores that invariant
/// before returning.
///
/// # Example
///
/// ```rust
/// use line_editor_core::{LineBuffer, LineEnding};
///
/// let mut buffer = LineBuffer::from_lines(vec!["alpha".into(), "beta".into()]);
/// buffer.insert_line(1, "between");
/// assert_eq!(buffer.lines_as_string(0, 3, LineEnding::Lf), "alpha\nbetween\nbeta");
///
/// buffer.remove_range(0, 10);
/// assert_eq!(buffer.line_count(), 1);
/// assert_eq!(buffer.line(0), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    compaction_threshold: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create a buffer holding one empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
        }
    }

    /// Create a buffer from owned lines. An empty vector becomes one empty line.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut buffer = Self {
            lines,
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
        };
        buffer.ensure_not_empty();
        buffer
    }

    /// Set how many removed lines trigger an explicit shrink of the backing storage.
    pub fn with_compaction_threshold(mut self, threshold: usize) -> Self {
        self.compaction_threshold = threshold;
        self
    }

    /// Current compaction threshold.
    pub fn compaction_threshold(&self) -> usize {
        self.compaction_threshold
    }

    /// Change the compaction threshold.
    pub fn set_compaction_threshold(&mut self, threshold: usize) {
        self.compaction_threshold = threshold;
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last line.
    pub fn last_line_index(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Clamp a line index into `[0, line_count - 1]`.
    pub fn clamp_line(&self, index: usize) -> usize {
        index.min(self.last_line_index())
    }

    /// Text of line `index` (clamped).
    pub fn line(&self, index: usize) -> &str {
        self.lines
            .get(self.clamp_line(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Length in characters of line `index` (clamped).
    pub fn line_len(&self, index: usize) -> usize {
        crate::text::char_len(self.line(index))
    }

    /// Length in characters of the last line.
    pub fn last_line_len(&self) -> usize {
        self.line_len(self.last_line_index())
    }

    /// All lines as a slice.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Iterate over line texts.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    /// Replace the text of line `index` (clamped).
    pub fn set_line(&mut self, index: usize, text: impl Into<String>) {
        let index = self.clamp_line(index);
        self.lines[index] = text.into();
    }

    /// Insert a line before `index`, or append when `index >= line_count`.
    pub fn insert_line(&mut self, index: usize, text: impl Into<String>) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, text.into());
    }

    /// Insert several lines before `index` (or append) with a single splice.
    pub fn insert_lines<I>(&mut self, index: usize, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        let index = index.min(self.lines.len());
        self.lines.splice(index..index, lines);
    }

    /// Remove `count` lines starting at `start`.
    ///
    /// `start` is clamped to the last line and `count` to the lines remaining after it.
    /// Removing everything leaves one empty line behind.
    pub fn remove_range(&mut self, start: usize, count: usize) {
        let start = self.clamp_line(start);
        let range = self.clamp_range(start, count);
        let removed = range.len();
        self.lines.drain(range);
        self.after_removal(removed);
    }

    /// Replace `count` lines at `start` with `lines` in one splice.
    ///
    /// `start` may equal `line_count` (pure append). This is the primitive the edit engine and
    /// the undo history use for every multi-line change.
    pub fn replace_range<I>(&mut self, start: usize, count: usize, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        let start = start.min(self.lines.len());
        let range = self.clamp_range(start, count);
        let removed = range.len();
        self.lines.splice(range, lines);
        self.after_removal(removed);
    }

    /// Join `count` lines starting at `start` with `line_ending`.
    pub fn lines_as_string(&self, start: usize, count: usize, line_ending: LineEnding) -> String {
        let start = self.clamp_line(start);
        let range = self.clamp_range(start, count);
        line_ending.join(&self.lines[range])
    }

    /// Reset to one empty line.
    pub fn clear(&mut self) {
        let removed = self.lines.len();
        self.lines.clear();
        self.after_removal(removed);
    }

    /// Replace the whole content.
    pub fn clear_and_load(&mut self, lines: Vec<String>) {
        let removed = self.lines.len();
        self.lines = lines;
        if removed > self.compaction_threshold {
            debug!(removed, "released storage of replaced document");
        }
        self.ensure_not_empty();
    }

    /// Reserve room for `additional` more lines without aborting on allocation failure.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.lines.try_reserve(additional)
    }

    /// Release spare capacity of the line vector.
    pub fn shrink_to_fit(&mut self) {
        self.lines.shrink_to_fit();
    }

    /// Allocated line slots.
    pub fn capacity(&self) -> usize {
        self.lines.capacity()
    }

    /// Re-insert one empty line if the buffer is empty. Returns `true` if it healed.
    pub(crate) fn ensure_not_empty(&mut self) -> bool {
        if self.lines.is_empty() {
            self.lines.push(String::new());
            true
        } else {
            false
        }
    }

    fn clamp_range(&self, start: usize, count: usize) -> Range<usize> {
        let start = start.min(self.lines.len());
        let end = start.saturating_add(count).min(self.lines.len());
        start..end
    }

    fn after_removal(&mut self, removed: usize) {
        if removed > self.compaction_threshold {
            debug!(
                removed,
                remaining = self.lines.len(),
                "compacting line storage"
            );
            self.lines.shrink_to_fit();
        }
        self.ensure_not_empty();
    }
}

impl From<&str> for LineBuffer {
    fn from(text: &str) -> Self {
        Self::from_lines(
            crate::line_ending::split_lines(text)
                .into_iter()
                .map(str::to_string)
                .collect(),
        )
    }
}
