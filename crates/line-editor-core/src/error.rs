//! Error types.

use crate::search::SearchError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Errors produced by edit operations.
///
/// Out-of-range positions are never errors: they are clamped. The only failure an edit can
/// report is running out of memory while preparing an insert or paste (composing its lines,
/// growing the line storage or taking its history snapshots), after the one retry the engine
/// performs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Allocating for the edit failed twice; it was abandoned before any change.
    #[error("out of memory while preparing an edit: {source}")]
    OutOfMemory {
        /// Allocator error from the second attempt.
        #[source]
        source: TryReserveError,
    },
}

/// Errors reported by compound session operations and the command layer.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// An edit failed.
    #[error(transparent)]
    Edit(#[from] EditError),
    /// A search query could not be compiled.
    #[error(transparent)]
    Search(#[from] SearchError),
    /// Undo was requested with an empty undo stack.
    #[error("nothing to undo")]
    NothingToUndo,
    /// Redo was requested with an empty redo stack.
    #[error("nothing to redo")]
    NothingToRedo,
    /// A search or replace was requested with an empty query.
    #[error("search query cannot be empty")]
    EmptyQuery,
    /// A find command found no occurrence.
    #[error("no match for {query:?}")]
    NoMatch {
        /// The query that was searched for.
        query: String,
    },
}
