//! Line-scoped text search.
//!
//! Queries are matched one line at a time, so a match never spans a line break. Plain queries
//! are escaped and compiled into a regex, which keeps a single matching path for both modes.
//! All public positions are **character offsets** within a line.

use crate::cursor::CursorPosition;
use crate::line_buffer::LineBuffer;
use crate::line_ending::split_lines;
use crate::selection::TextSelection;
use crate::text::{byte_offset, char_len};
use regex::{Regex, RegexBuilder};
use std::ops::Range;
use thiserror::Error;

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words (alphanumeric and `_`).
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// A match on one line, as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Line index.
    pub line: usize,
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The match as a selection running from its start to its end.
    pub fn selection(&self) -> TextSelection {
        TextSelection::new(
            CursorPosition::new(self.line, self.start),
            CursorPosition::new(self.line, self.end),
        )
    }
}

/// Search errors.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// The lines a replace-all rewrote, ready to be spliced back as one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReplacement {
    /// First line that contained a match.
    pub start_line: usize,
    /// Number of original lines from `start_line` through the last line with a match.
    pub line_count: usize,
    /// Replacement lines. Longer than `line_count` if the replacement text had line breaks.
    pub lines: Vec<String>,
    /// Number of matches replaced.
    pub replacements: usize,
}

/// A compiled query.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    regex: Regex,
    options: SearchOptions,
}

impl SearchQuery {
    /// Compile `query` under `options`.
    pub fn new(query: &str, options: SearchOptions) -> Result<Self, SearchError> {
        let pattern = if options.regex {
            query.to_string()
        } else {
            regex::escape(query)
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .build()?;
        Ok(Self { regex, options })
    }

    /// Non-empty match byte ranges in `text`, starting the scan at `from_byte`.
    fn byte_matches(&self, text: &str, from_byte: usize) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        let mut at = from_byte;
        while at <= text.len() {
            let Some(m) = self.regex.find_at(text, at) else {
                break;
            };
            if m.is_empty() {
                at = m.end() + text[m.end()..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            if !self.options.whole_word || is_whole_word(text, m.range()) {
                out.push(m.range());
            }
            at = m.end();
        }
        out
    }

    /// Rewrite every match in `text`. Returns `None` if nothing matched.
    fn replace_in_line(&self, text: &str, replacement: &str) -> Option<(String, usize)> {
        let ranges = self.byte_matches(text, 0);
        if ranges.is_empty() {
            return None;
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for range in &ranges {
            out.push_str(&text[last..range.start]);
            if self.options.regex {
                match self.regex.captures_at(text, range.start) {
                    Some(caps) => caps.expand(replacement, &mut out),
                    None => out.push_str(replacement),
                }
            } else {
                out.push_str(replacement);
            }
            last = range.end;
        }
        out.push_str(&text[last..]);
        Some((out, ranges.len()))
    }
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn is_whole_word(text: &str, range: Range<usize>) -> bool {
    let before = text[..range.start].chars().next_back();
    let after = text[range.end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn to_match(text: &str, line: usize, range: Range<usize>) -> SearchMatch {
    let start = char_len(&text[..range.start]);
    SearchMatch {
        line,
        start,
        end: start + char_len(&text[range]),
    }
}

/// Find the next occurrence of `query` at or after `from`.
///
/// Returns `Ok(None)` if no match is found (or if `query` is empty). Does not wrap.
pub fn find_next(
    buffer: &LineBuffer,
    query: &str,
    options: SearchOptions,
    from: CursorPosition,
) -> Result<Option<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Ok(None);
    }

    let compiled = SearchQuery::new(query, options)?;
    let from = from.clamped(buffer);
    for line in from.line..buffer.line_count() {
        let text = buffer.line(line);
        let from_byte = if line == from.line {
            byte_offset(text, from.character)
        } else {
            0
        };
        if let Some(range) = compiled.byte_matches(text, from_byte).into_iter().next() {
            return Ok(Some(to_match(text, line, range)));
        }
    }
    Ok(None)
}

/// Find the last occurrence of `query` that ends at or before `from`.
pub fn find_prev(
    buffer: &LineBuffer,
    query: &str,
    options: SearchOptions,
    from: CursorPosition,
) -> Result<Option<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Ok(None);
    }

    let compiled = SearchQuery::new(query, options)?;
    let from = from.clamped(buffer);
    for line in (0..=from.line).rev() {
        let text = buffer.line(line);
        let limit = if line == from.line {
            byte_offset(text, from.character)
        } else {
            text.len()
        };
        let last = compiled
            .byte_matches(text, 0)
            .into_iter()
            .take_while(|range| range.end <= limit)
            .last();
        if let Some(range) = last {
            return Ok(Some(to_match(text, line, range)));
        }
    }
    Ok(None)
}

/// Find all occurrences of `query`, in document order.
pub fn find_all(
    buffer: &LineBuffer,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let compiled = SearchQuery::new(query, options)?;
    let mut matches = Vec::new();
    for (line, text) in buffer.iter().enumerate() {
        matches.extend(
            compiled
                .byte_matches(text, 0)
                .into_iter()
                .map(|range| to_match(text, line, range)),
        );
    }
    Ok(matches)
}

/// Compute the result of replacing every occurrence of `query` with `replacement`.
///
/// In regex mode `$1`/`${name}` in `replacement` refer to capture groups. The result covers
/// the lines from the first to the last match, so it can be applied as one splice. Returns
/// `Ok(None)` if nothing matched.
pub fn replace_all(
    buffer: &LineBuffer,
    query: &str,
    options: SearchOptions,
    replacement: &str,
) -> Result<Option<LineReplacement>, SearchError> {
    if query.is_empty() {
        return Ok(None);
    }

    let compiled = SearchQuery::new(query, options)?;
    let mut rewritten: Vec<(usize, String, usize)> = Vec::new();
    for (line, text) in buffer.iter().enumerate() {
        if let Some((updated, count)) = compiled.replace_in_line(text, replacement) {
            rewritten.push((line, updated, count));
        }
    }

    let (Some(first), Some(last)) = (rewritten.first(), rewritten.last()) else {
        return Ok(None);
    };
    let start_line = first.0;
    let line_count = last.0 - start_line + 1;

    let mut lines = Vec::with_capacity(line_count);
    let mut replacements = 0;
    let mut pending = rewritten.iter().peekable();
    for line in start_line..start_line + line_count {
        match pending.next_if(|(idx, _, _)| *idx == line) {
            Some((_, updated, count)) => {
                replacements += count;
                lines.extend(split_lines(updated).into_iter().map(str::to_string));
            }
            None => lines.push(buffer.line(line).to_string()),
        }
    }

    Ok(Some(LineReplacement {
        start_line,
        line_count,
        lines,
        replacements,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn find_next_moves_across_lines() {
        let buf = buffer(&["foo bar", "bar foo"]);
        let opts = SearchOptions::default();
        let m = find_next(&buf, "foo", opts, CursorPosition::new(0, 1))
            .unwrap()
            .unwrap();
        assert_eq!(m, SearchMatch { line: 1, start: 4, end: 7 });
        assert_eq!(
            find_next(&buf, "foo", opts, CursorPosition::new(1, 5)).unwrap(),
            None
        );
    }

    #[test]
    fn find_prev_respects_limit() {
        let buf = buffer(&["ab ab", "xx"]);
        let m = find_prev(&buf, "ab", SearchOptions::default(), CursorPosition::new(0, 4))
            .unwrap()
            .unwrap();
        assert_eq!((m.start, m.end), (0, 2));
    }

    #[test]
    fn case_and_whole_word_options() {
        let buf = buffer(&["Foo foobar foo_x FOO"]);
        let opts = SearchOptions {
            case_sensitive: false,
            whole_word: true,
            regex: false,
        };
        let matches = find_all(&buf, "foo", opts).unwrap();
        let starts: Vec<usize> = matches.iter().map(|m| m.start).collect();
        assert_eq!(starts, vec![0, 17]);
    }

    #[test]
    fn offsets_are_characters() {
        let buf = buffer(&["héllo wörld"]);
        let m = find_all(&buf, "wörld", SearchOptions::default()).unwrap();
        assert_eq!(m[0].start, 6);
        assert_eq!(m[0].len(), 5);
    }

    #[test]
    fn plain_queries_are_escaped() {
        let buf = buffer(&["a.b axb"]);
        let m = find_all(&buf, "a.b", SearchOptions::default()).unwrap();
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn invalid_regex_is_reported() {
        let buf = buffer(&["x"]);
        let opts = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        assert!(matches!(
            find_all(&buf, "(", opts),
            Err(SearchError::InvalidRegex(_))
        ));
    }

    #[test]
    fn replace_all_covers_first_to_last_matched_line() {
        let buf = buffer(&["keep", "one x", "mid", "x two x", "tail"]);
        let result = replace_all(&buf, "x", SearchOptions::default(), "y")
            .unwrap()
            .unwrap();
        assert_eq!(result.start_line, 1);
        assert_eq!(result.line_count, 3);
        assert_eq!(result.lines, vec!["one y", "mid", "y two y"]);
        assert_eq!(result.replacements, 3);
    }

    #[test]
    fn regex_replacement_expands_captures() {
        let buf = buffer(&["let a = 1;", "let b = 2;"]);
        let opts = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        let result = replace_all(&buf, r"let (\w+)", opts, "const $1")
            .unwrap()
            .unwrap();
        assert_eq!(result.lines, vec!["const a = 1;", "const b = 2;"]);
    }

    #[test]
    fn replacement_with_line_break_splits_lines() {
        let buf = buffer(&["a,b"]);
        let result = replace_all(&buf, ",", SearchOptions::default(), "\n")
            .unwrap()
            .unwrap();
        assert_eq!(result.line_count, 1);
        assert_eq!(result.lines, vec!["a", "b"]);
    }

    #[test]
    fn no_match_is_none() {
        let buf = buffer(&["abc"]);
        assert_eq!(
            replace_all(&buf, "z", SearchOptions::default(), "y").unwrap(),
            None
        );
    }
}
