use bitvec::prelude::*;
use std::fmt;

use crate::spatial::grid::CellCoord;

/// Fixed-size bitset over the cells of a square grid
///
/// Keys cells by their row-major index. Provides O(1) membership testing for
/// the sampler's transient retry exclusions.
#[derive(Clone, Debug)]
pub struct CellSet {
    bits: BitVec,
    side: usize,
}

impl CellSet {
    /// Create a set with no cells present
    pub fn new(side: usize) -> Self {
        Self {
            bits: bitvec![0; side * side],
            side,
        }
    }

    /// Insert a cell; out-of-range coordinates are ignored
    pub fn insert(&mut self, cell: CellCoord) {
        if cell[0] < self.side && cell[1] < self.side {
            self.bits.set(cell[0] * self.side + cell[1], true);
        }
    }

    /// Remove a cell; out-of-range coordinates are ignored
    pub fn remove(&mut self, cell: CellCoord) {
        if cell[0] < self.side && cell[1] < self.side {
            self.bits.set(cell[0] * self.side + cell[1], false);
        }
    }

    /// Test cell membership
    pub fn contains(&self, cell: CellCoord) -> bool {
        if cell[0] < self.side && cell[1] < self.side {
            self.bits.get(cell[0] * self.side + cell[1]).as_deref() == Some(&true)
        } else {
            false
        }
    }

    /// Remove every cell
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Test if no cells are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count cells in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Extract all member cells in row-major order
    pub fn to_vec(&self) -> Vec<CellCoord> {
        self.bits
            .iter_ones()
            .map(|index| [index / self.side, index % self.side])
            .collect()
    }
}

impl fmt::Display for CellSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellSet({} cells: {:?})", self.count(), self.to_vec())
    }
}
