//! Snapshot-based undo/redo.
//!
//! Each entry is a full copy of the [`Scene`]. Callers decide where a commit
//! boundary lies; the history itself only stores and swaps snapshots.

use std::collections::VecDeque;

use crate::Scene;

/// Maximum number of undo entries kept by default.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Bounded undo stack with a redo stack.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Scene>,
    redo: Vec<Scene>,
    depth: usize,
}

impl History {
    /// Create an empty history with the default depth.
    #[must_use]
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_HISTORY_DEPTH)
    }

    /// Create an empty history keeping at most `depth` undo entries.
    #[must_use]
    pub fn with_depth(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Push a snapshot of `scene` and clear the redo stack.
    ///
    /// The oldest entry is dropped once the depth is exceeded.
    pub fn commit(&mut self, scene: &Scene) {
        self.undo.push_back(scene.clone());
        if self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        self.redo.clear();
        tracing::debug!("History commit ({} undo entries)", self.undo.len());
    }

    /// Step back: returns the scene to restore, stashing `current` for redo.
    ///
    /// Returns `None` (and changes nothing) when there is nothing to undo.
    pub fn undo(&mut self, current: &Scene) -> Option<Scene> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    /// Step forward: returns the scene to restore, stashing `current` for undo.
    ///
    /// Returns `None` (and changes nothing) when there is nothing to redo.
    pub fn redo(&mut self, current: &Scene) -> Option<Scene> {
        let next = self.redo.pop()?;
        self.undo.push_back(current.clone());
        if self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        Some(next)
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo entries.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo entries.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Maximum number of undo entries.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
