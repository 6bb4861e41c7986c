//! Selection ranges.
//!
//! A [`TextSelection`] keeps its two anchors in drag order; [`TextSelection::ordered`] gives
//! the document-order view every edit works with. "No selection" is represented by
//! `Option::None` in [`SelectionModel`], and a selection whose anchors coincide behaves like
//! no selection for every edit.

use crate::cursor::CursorPosition;
use crate::line_buffer::LineBuffer;
use crate::text::char_slice;

/// Selection anchored at `start` and extended to `end` (not necessarily in document order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextSelection {
    /// Anchor where the selection began.
    pub start: CursorPosition,
    /// Active end (follows the caret).
    pub end: CursorPosition,
}

/// Document-order view of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderedSelection {
    /// First selected line.
    pub start_line: usize,
    /// First selected character on `start_line`.
    pub start_character: usize,
    /// Last line touched by the selection.
    pub end_line: usize,
    /// Exclusive end character on `end_line`.
    pub end_character: usize,
}

impl OrderedSelection {
    /// Start as a position.
    pub fn start(&self) -> CursorPosition {
        CursorPosition::new(self.start_line, self.start_character)
    }

    /// End as a position.
    pub fn end(&self) -> CursorPosition {
        CursorPosition::new(self.end_line, self.end_character)
    }

    /// `true` if start and end coincide.
    pub fn is_empty(&self) -> bool {
        self.start() == self.end()
    }

    /// Number of lines touched.
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Whether the boundary lines of a selection count as "in" it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineInclusion {
    /// First and last selected lines count.
    #[default]
    Inclusive,
    /// Only lines strictly between the first and last selected line count.
    Exclusive,
}

impl TextSelection {
    /// Create a selection from anchor to active end.
    pub fn new(start: CursorPosition, end: CursorPosition) -> Self {
        Self { start, end }
    }

    /// A collapsed selection at `pos`.
    pub fn caret(pos: CursorPosition) -> Self {
        Self::new(pos, pos)
    }

    /// `true` iff the anchors differ in line or character.
    pub fn has_selection(&self) -> bool {
        self.start != self.end
    }

    /// Document-order view: compare line first, then character.
    pub fn ordered(&self) -> OrderedSelection {
        let (min, max) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        OrderedSelection {
            start_line: min.line,
            start_character: min.character,
            end_line: max.line,
            end_character: max.character,
        }
    }

    /// Both anchors clamped into `buffer`.
    pub fn clamped(&self, buffer: &LineBuffer) -> Self {
        Self::new(self.start.clamped(buffer), self.end.clamped(buffer))
    }

    /// `true` iff the selection runs from `(0, 0)` to the end of the last line.
    pub fn is_whole_text(&self, buffer: &LineBuffer) -> bool {
        let ordered = self.clamped(buffer).ordered();
        ordered.start() == CursorPosition::document_start()
            && ordered.end() == CursorPosition::document_end(buffer)
    }

    /// `true` iff both boundaries land exactly on line boundaries: the start at character 0
    /// and the end at the end of its line.
    pub fn is_whole_lines(&self, buffer: &LineBuffer) -> bool {
        let ordered = self.clamped(buffer).ordered();
        ordered.start_character == 0 && ordered.end_character == buffer.line_len(ordered.end_line)
    }

    /// Whether `line` lies inside the selection under the given boundary policy.
    pub fn contains_line(&self, line: usize, inclusion: LineInclusion) -> bool {
        let ordered = self.ordered();
        match inclusion {
            LineInclusion::Inclusive => (ordered.start_line..=ordered.end_line).contains(&line),
            LineInclusion::Exclusive => line > ordered.start_line && line < ordered.end_line,
        }
    }

    /// Whether `pos` lies between the ordered anchors (both ends inclusive).
    pub fn contains(&self, pos: CursorPosition) -> bool {
        let ordered = self.ordered();
        ordered.start() <= pos && pos <= ordered.end()
    }

    /// Selected text, lines joined with `'\n'`.
    pub fn text(&self, buffer: &LineBuffer) -> String {
        let ordered = self.clamped(buffer).ordered();
        if ordered.start_line == ordered.end_line {
            return char_slice(
                buffer.line(ordered.start_line),
                ordered.start_character,
                ordered.end_character,
            )
            .to_string();
        }

        let mut out = String::new();
        for line in ordered.start_line..=ordered.end_line {
            let text = buffer.line(line);
            let piece = if line == ordered.start_line {
                char_slice(text, ordered.start_character, usize::MAX)
            } else if line == ordered.end_line {
                char_slice(text, 0, ordered.end_character)
            } else {
                text
            };
            if line > ordered.start_line {
                out.push('\n');
            }
            out.push_str(piece);
        }
        out
    }
}

/// The session's selection state: either unset or a pair of anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionModel {
    range: Option<TextSelection>,
}

impl SelectionModel {
    /// Unset selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current anchors, if set.
    pub fn get(&self) -> Option<&TextSelection> {
        self.range.as_ref()
    }

    /// Set both anchors.
    pub fn set(&mut self, start: CursorPosition, end: CursorPosition) {
        self.range = Some(TextSelection::new(start, end));
    }

    /// Move the anchor; an unset selection becomes a caret at `pos`.
    pub fn set_start(&mut self, pos: CursorPosition) {
        match &mut self.range {
            Some(range) => range.start = pos,
            None => self.range = Some(TextSelection::caret(pos)),
        }
    }

    /// Move the active end; an unset selection becomes a caret at `pos`.
    pub fn set_end(&mut self, pos: CursorPosition) {
        match &mut self.range {
            Some(range) => range.end = pos,
            None => self.range = Some(TextSelection::caret(pos)),
        }
    }

    /// Unset.
    pub fn clear(&mut self) {
        self.range = None;
    }

    /// Replace the whole state.
    pub fn replace(&mut self, range: Option<TextSelection>) {
        self.range = range;
    }

    /// `true` iff set and the anchors differ. Recomputed on every call.
    pub fn has_selection(&self) -> bool {
        self.range.is_some_and(|r| r.has_selection())
    }

    /// Ordered view of the current anchors.
    pub fn ordered(&self) -> Option<OrderedSelection> {
        self.range.map(|r| r.ordered())
    }

    /// The selection only if it is effective (anchors differ).
    pub fn effective(&self) -> Option<TextSelection> {
        self.range.filter(TextSelection::has_selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    fn pos(line: usize, character: usize) -> CursorPosition {
        CursorPosition::new(line, character)
    }

    #[test]
    fn ordered_is_direction_independent() {
        let forward = TextSelection::new(pos(0, 4), pos(2, 1));
        let backward = TextSelection::new(pos(2, 1), pos(0, 4));
        assert_eq!(forward.ordered(), backward.ordered());
        assert_eq!(forward.ordered().start_line, 0);
        assert_eq!(forward.ordered().end_character, 1);
    }

    #[test]
    fn same_line_orders_by_character() {
        let sel = TextSelection::new(pos(1, 5), pos(1, 2));
        let ordered = sel.ordered();
        assert_eq!((ordered.start_character, ordered.end_character), (2, 5));
    }

    #[test]
    fn equal_anchors_have_no_selection() {
        let mut model = SelectionModel::new();
        assert!(!model.has_selection());
        model.set(pos(1, 1), pos(1, 1));
        assert!(!model.has_selection());
        assert!(model.effective().is_none());
        model.set_end(pos(1, 2));
        assert!(model.has_selection());
    }

    #[test]
    fn set_start_on_unset_creates_caret() {
        let mut model = SelectionModel::new();
        model.set_start(pos(3, 3));
        assert_eq!(model.get(), Some(&TextSelection::caret(pos(3, 3))));
    }

    #[test]
    fn whole_text_and_whole_lines_predicates() {
        let buf = buffer(&["abc", "de"]);
        assert!(TextSelection::new(pos(1, 2), pos(0, 0)).is_whole_text(&buf));
        assert!(!TextSelection::new(pos(0, 1), pos(1, 2)).is_whole_text(&buf));
        assert!(TextSelection::new(pos(0, 0), pos(0, 3)).is_whole_lines(&buf));
        assert!(!TextSelection::new(pos(0, 0), pos(1, 1)).is_whole_lines(&buf));
    }

    #[test]
    fn line_inclusion_policy() {
        let sel = TextSelection::new(pos(1, 2), pos(3, 0));
        assert!(sel.contains_line(1, LineInclusion::Inclusive));
        assert!(sel.contains_line(3, LineInclusion::Inclusive));
        assert!(!sel.contains_line(1, LineInclusion::Exclusive));
        assert!(sel.contains_line(2, LineInclusion::Exclusive));
        assert!(!sel.contains_line(4, LineInclusion::Inclusive));
    }

    #[test]
    fn selected_text_spans_lines() {
        let buf = buffer(&["hello", "big", "world"]);
        let sel = TextSelection::new(pos(2, 3), pos(0, 3));
        assert_eq!(sel.text(&buf), "lo\nbig\nwor");
        assert!(sel.contains(pos(1, 0)));
        assert!(!sel.contains(pos(2, 4)));
    }
}
