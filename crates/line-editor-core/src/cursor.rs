//! Caret positions and navigation.
//!
//! A [`CursorPosition`] is a plain `(line, character)` pair. Arithmetic on it may leave the
//! character past the end of its line; anything that reads it against a buffer clamps first
//! (see [`CursorPosition::clamped`]).

use crate::line_buffer::LineBuffer;
use crate::text::split_at_char;
use std::cmp::Ordering;
use unicode_segmentation::UnicodeSegmentation;

/// Caret position (line and character index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CursorPosition {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based character index within the line.
    pub character: usize,
}

impl CursorPosition {
    /// Create a new position.
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }

    /// Clamp the line into the buffer and the character into `[0, line_len]`.
    pub fn clamped(self, buffer: &LineBuffer) -> Self {
        let line = buffer.clamp_line(self.line);
        Self {
            line,
            character: self.character.min(buffer.line_len(line)),
        }
    }

    /// One grapheme left; at the start of a line, the end of the previous line.
    pub fn move_left(self, buffer: &LineBuffer) -> Self {
        self.step_left(buffer, false)
    }

    /// One grapheme right; at the end of a line, the start of the next line.
    pub fn move_right(self, buffer: &LineBuffer) -> Self {
        self.step_right(buffer, false)
    }

    /// One word run left (same line-boundary rule as [`move_left`](Self::move_left)).
    pub fn move_word_left(self, buffer: &LineBuffer) -> Self {
        self.step_left(buffer, true)
    }

    /// One word run right (same line-boundary rule as [`move_right`](Self::move_right)).
    pub fn move_word_right(self, buffer: &LineBuffer) -> Self {
        self.step_right(buffer, true)
    }

    /// Previous line, same character clamped; on the first line, the document start.
    pub fn move_up(self, buffer: &LineBuffer) -> Self {
        let pos = self.clamped(buffer);
        if pos.line == 0 {
            return Self::new(0, 0);
        }
        Self::new(pos.line - 1, self.character).clamped(buffer)
    }

    /// Next line, same character clamped; on the last line, the document end.
    pub fn move_down(self, buffer: &LineBuffer) -> Self {
        let pos = self.clamped(buffer);
        if pos.line >= buffer.last_line_index() {
            return Self::document_end(buffer);
        }
        Self::new(pos.line + 1, self.character).clamped(buffer)
    }

    /// Start of the current line.
    pub fn line_start(self, buffer: &LineBuffer) -> Self {
        Self::new(buffer.clamp_line(self.line), 0)
    }

    /// End of the current line.
    pub fn line_end(self, buffer: &LineBuffer) -> Self {
        let line = buffer.clamp_line(self.line);
        Self::new(line, buffer.line_len(line))
    }

    /// `(0, 0)`.
    pub fn document_start() -> Self {
        Self::new(0, 0)
    }

    /// End of the last line.
    pub fn document_end(buffer: &LineBuffer) -> Self {
        Self::new(buffer.last_line_index(), buffer.last_line_len())
    }

    /// Apply a [`Movement`].
    pub fn moved(self, movement: Movement, buffer: &LineBuffer) -> Self {
        match movement {
            Movement::Left => self.move_left(buffer),
            Movement::Right => self.move_right(buffer),
            Movement::WordLeft => self.move_word_left(buffer),
            Movement::WordRight => self.move_word_right(buffer),
            Movement::Up => self.move_up(buffer),
            Movement::Down => self.move_down(buffer),
            Movement::LineStart => self.line_start(buffer),
            Movement::LineEnd => self.line_end(buffer),
            Movement::DocumentStart => Self::document_start(),
            Movement::DocumentEnd => Self::document_end(buffer),
        }
    }

    fn step_left(self, buffer: &LineBuffer, word_mode: bool) -> Self {
        let pos = self.clamped(buffer);
        if pos.character == 0 {
            if pos.line == 0 {
                return pos;
            }
            return Self::new(pos.line - 1, buffer.line_len(pos.line - 1));
        }
        let steps = steps_to_move_left(buffer.line(pos.line), pos.character, word_mode);
        Self::new(pos.line, pos.character - steps)
    }

    fn step_right(self, buffer: &LineBuffer, word_mode: bool) -> Self {
        let pos = self.clamped(buffer);
        let len = buffer.line_len(pos.line);
        if pos.character >= len {
            if pos.line >= buffer.last_line_index() {
                return pos;
            }
            return Self::new(pos.line + 1, 0);
        }
        let steps = steps_to_move_right(buffer.line(pos.line), pos.character, word_mode);
        Self::new(pos.line, pos.character + steps)
    }
}

impl Ord for CursorPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.character.cmp(&other.character))
    }
}

impl PartialOrd for CursorPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(usize, usize)> for CursorPosition {
    fn from((line, character): (usize, usize)) -> Self {
        Self::new(line, character)
    }
}

/// Caret movements understood by [`CursorPosition::moved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// One grapheme left.
    Left,
    /// One grapheme right.
    Right,
    /// One word run left.
    WordLeft,
    /// One word run right.
    WordRight,
    /// One line up.
    Up,
    /// One line down.
    Down,
    /// Start of the line.
    LineStart,
    /// End of the line.
    LineEnd,
    /// `(0, 0)`.
    DocumentStart,
    /// End of the last line.
    DocumentEnd,
}

/// Token class used for word-wise navigation and deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Spaces, tabs and other Unicode whitespace.
    Whitespace,
    /// Alphanumerics and `_`.
    Word,
    /// Everything else.
    Punctuation,
}

impl CharClass {
    /// Classify one character.
    pub fn of(ch: char) -> Self {
        if ch.is_whitespace() {
            Self::Whitespace
        } else if ch == '_' || ch.is_alphanumeric() {
            Self::Word
        } else {
            Self::Punctuation
        }
    }
}

/// How many characters a left step from `character` covers on `line`.
///
/// Never crosses the start of the line, so the result is at most `character`. In word mode
/// the step skips whitespace and then one run of a single [`CharClass`]; otherwise it covers
/// the grapheme cluster before the caret.
pub fn steps_to_move_left(line: &str, character: usize, word_mode: bool) -> usize {
    let (before, _) = split_at_char(line, character);
    if before.is_empty() {
        return 0;
    }

    if !word_mode {
        return before
            .graphemes(true)
            .next_back()
            .map(|g| g.chars().count())
            .unwrap_or(0);
    }

    let mut chars = before.chars().rev().peekable();
    let mut steps = 0;
    while chars.next_if(|c| CharClass::of(*c) == CharClass::Whitespace).is_some() {
        steps += 1;
    }
    if let Some(&first) = chars.peek() {
        let class = CharClass::of(first);
        while chars.next_if(|c| CharClass::of(*c) == class).is_some() {
            steps += 1;
        }
    }
    steps
}

/// How many characters a right step from `character` covers on `line`.
///
/// Never crosses the end of the line. In word mode the step skips one run of a single
/// [`CharClass`] and then any whitespace after it; otherwise it covers the grapheme cluster
/// after the caret.
pub fn steps_to_move_right(line: &str, character: usize, word_mode: bool) -> usize {
    let (_, after) = split_at_char(line, character);
    if after.is_empty() {
        return 0;
    }

    if !word_mode {
        return after
            .graphemes(true)
            .next()
            .map(|g| g.chars().count())
            .unwrap_or(0);
    }

    let mut chars = after.chars().peekable();
    let mut steps = 0;
    if let Some(&first) = chars.peek() {
        let class = CharClass::of(first);
        while chars.next_if(|c| CharClass::of(*c) == class).is_some() {
            steps += 1;
        }
    }
    while chars.next_if(|c| CharClass::of(*c) == CharClass::Whitespace).is_some() {
        steps += 1;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn ordering_is_line_then_character() {
        assert!(CursorPosition::new(0, 9) < CursorPosition::new(1, 0));
        assert!(CursorPosition::new(2, 1) < CursorPosition::new(2, 3));
        assert_eq!(CursorPosition::new(1, 1), CursorPosition::from((1, 1)));
    }

    #[test]
    fn left_at_line_start_wraps_to_previous_end() {
        let buf = buffer(&["foo", "bar"]);
        assert_eq!(
            CursorPosition::new(1, 0).move_left(&buf),
            CursorPosition::new(0, 3)
        );
        assert_eq!(
            CursorPosition::new(0, 0).move_left(&buf),
            CursorPosition::new(0, 0)
        );
    }

    #[test]
    fn right_at_line_end_wraps_to_next_start() {
        let buf = buffer(&["foo", "bar"]);
        assert_eq!(
            CursorPosition::new(0, 3).move_right(&buf),
            CursorPosition::new(1, 0)
        );
        assert_eq!(
            CursorPosition::new(1, 3).move_right(&buf),
            CursorPosition::new(1, 3)
        );
    }

    #[test]
    fn vertical_moves_clamp_and_stop_at_edges() {
        let buf = buffer(&["long line", "ab", "tail"]);
        assert_eq!(
            CursorPosition::new(0, 7).move_down(&buf),
            CursorPosition::new(1, 2)
        );
        assert_eq!(
            CursorPosition::new(0, 7).move_up(&buf),
            CursorPosition::new(0, 0)
        );
        assert_eq!(
            CursorPosition::new(2, 1).move_down(&buf),
            CursorPosition::new(2, 4)
        );
    }

    #[test]
    fn out_of_range_positions_are_clamped_before_use() {
        let buf = buffer(&["ab"]);
        assert_eq!(
            CursorPosition::new(5, 50).clamped(&buf),
            CursorPosition::new(0, 2)
        );
        assert_eq!(
            CursorPosition::new(5, 50).move_left(&buf),
            CursorPosition::new(0, 1)
        );
    }

    #[test]
    fn word_steps_respect_token_classes() {
        let line = "let foo_bar = baz(1);";
        assert_eq!(steps_to_move_right(line, 0, true), 4);
        assert_eq!(steps_to_move_right(line, 4, true), 8);
        assert_eq!(steps_to_move_right(line, 12, true), 2);
        assert_eq!(steps_to_move_left(line, 12, true), 8);
        assert_eq!(steps_to_move_left(line, 21, true), 2);
        assert_eq!(steps_to_move_left(line, 0, true), 0);
    }

    #[test]
    fn word_steps_never_cross_line_edges() {
        assert_eq!(steps_to_move_left("   ", 3, true), 3);
        assert_eq!(steps_to_move_right("abc", 3, true), 0);
    }

    #[test]
    fn plain_steps_cover_grapheme_clusters() {
        let line = "ae\u{301}x";
        assert_eq!(steps_to_move_left(line, 3, false), 2);
        assert_eq!(steps_to_move_right(line, 1, false), 2);
        assert_eq!(steps_to_move_right(line, 0, false), 1);
    }

    #[test]
    fn word_moves_wrap_across_lines_only_at_edges() {
        let buf = buffer(&["one two", "three"]);
        assert_eq!(
            CursorPosition::new(0, 7).move_word_right(&buf),
            CursorPosition::new(1, 0)
        );
        assert_eq!(
            CursorPosition::new(0, 7).move_word_left(&buf),
            CursorPosition::new(0, 4)
        );
    }
}
