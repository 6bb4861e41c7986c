//! Lazily recomputed "longest line" measurement.
//!
//! The horizontal scroll range of a front end depends on the widest line of the document.
//! Recomputing it is O(lines), so the edit engine only reports what it changed and the full
//! scan is deferred until someone asks.

use crate::line_buffer::LineBuffer;
use unicode_width::UnicodeWidthStr;

/// The widest line of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongestLine {
    /// Line index.
    pub line: usize,
    /// Display width in terminal cells (`unicode-width`).
    pub width: usize,
}

/// Display width of one line.
pub fn line_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Cache of the longest line with dirty tracking.
#[derive(Debug, Clone, Default)]
pub struct LongestLineCache {
    cached: Option<LongestLine>,
}

impl LongestLineCache {
    /// Create an empty (dirty) cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the next query must rescan the buffer.
    pub fn is_dirty(&self) -> bool {
        self.cached.is_none()
    }

    /// Cached line index, if the cache is clean.
    pub fn cached_line(&self) -> Option<usize> {
        self.cached.map(|c| c.line)
    }

    /// Drop the measurement.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Return the longest line, rescanning `buffer` only if dirty.
    ///
    /// Ties keep the first line of maximal width.
    pub fn get(&mut self, buffer: &LineBuffer) -> LongestLine {
        if let Some(cached) = self.cached {
            return cached;
        }
        let mut best = LongestLine { line: 0, width: 0 };
        for (line, text) in buffer.iter().enumerate() {
            let width = line_width(text);
            if width > best.width {
                best = LongestLine { line, width };
            }
        }
        self.cached = Some(best);
        best
    }

    /// Account for `removed` lines at `start` having been replaced by lines whose widths are
    /// `inserted`.
    ///
    /// If the cached line was among the removed ones the cache goes dirty. Otherwise its index
    /// is shifted past the splice and any inserted line that is wider takes its place, or an
    /// equally wide one that comes before it, matching what a rescan would pick.
    pub fn on_lines_replaced(&mut self, start: usize, removed: usize, inserted: &[usize]) {
        let Some(mut cached) = self.cached else {
            return;
        };

        if (start..start + removed).contains(&cached.line) {
            // A same-index 1:1 edit that only grew keeps the line as the longest.
            if removed == 1 && inserted.len() == 1 && inserted[0] >= cached.width {
                cached.width = inserted[0];
                self.cached = Some(cached);
            } else {
                self.cached = None;
            }
            return;
        }

        if cached.line >= start + removed {
            cached.line = cached.line - removed + inserted.len();
        }

        for (offset, &width) in inserted.iter().enumerate() {
            let line = start + offset;
            if width > cached.width || (width == cached.width && line < cached.line) {
                cached = LongestLine { line, width };
            }
        }
        self.cached = Some(cached);
    }
}
