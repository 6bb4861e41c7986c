//! Session configuration.

use crate::history::DEFAULT_MAX_UNDO_DEPTH;
use crate::line_buffer::DEFAULT_COMPACTION_THRESHOLD;
use crate::line_ending::LineEnding;

/// Settings an [`EditorSession`](crate::EditorSession) is created with.
///
/// # Example
///
/// ```rust
/// use line_editor_core::{EditorConfig, LineEnding};
///
/// let config = EditorConfig::default()
///     .with_line_ending(LineEnding::Crlf)
///     .with_max_undo_depth(200);
/// assert_eq!(config.max_undo_depth, 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Marker used to join lines and to split undo snapshots.
    pub line_ending: LineEnding,
    /// History items kept before the oldest groups are dropped.
    pub max_undo_depth: usize,
    /// Removals larger than this many lines shrink the line storage.
    pub compaction_threshold: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::Lf,
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
        }
    }
}

impl EditorConfig {
    /// Set the line ending.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Set the history depth (at least 1).
    pub fn with_max_undo_depth(mut self, depth: usize) -> Self {
        self.max_undo_depth = depth.max(1);
        self
    }

    /// Set the compaction threshold.
    pub fn with_compaction_threshold(mut self, threshold: usize) -> Self {
        self.compaction_threshold = threshold;
        self
    }
}
