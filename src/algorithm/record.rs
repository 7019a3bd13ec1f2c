use crate::spatial::grid::{CellCoord, Color};
use crate::spatial::topology::CurvatureClass;

/// One committed placement: a cell, its color, and its curvature class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Grid cell that received the color
    pub cell: CellCoord,
    /// Species placed
    pub color: Color,
    /// Curvature class of the cell
    pub class: CurvatureClass,
}

/// Append-only audit trail of committed placements
///
/// Records placements in commit order. Backtracking pops from the tail; no
/// other mutation exists. Two runs are byte-identical exactly when their logs
/// compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementLog {
    entries: Vec<Placement>,
}

impl PlacementLog {
    /// Create an empty log
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a committed placement
    pub fn push(&mut self, placement: Placement) {
        self.entries.push(placement);
    }

    /// Remove and return the most recent placement
    ///
    /// Used only by the backtracking path.
    pub fn pop(&mut self) -> Option<Placement> {
        self.entries.pop()
    }

    /// Most recent placement without removing it
    pub fn last(&self) -> Option<&Placement> {
        self.entries.last()
    }

    /// Number of recorded placements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no placements are recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All placements in commit order
    pub fn entries(&self) -> &[Placement] {
        &self.entries
    }
}
