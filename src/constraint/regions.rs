//! Named regions with per-region capacity limits
//!
//! A region is an immutable, possibly overlapping subset of grid cells with a
//! cap on the colored cells it may hold. Membership is inverted into a
//! cell-to-regions table at registration so eligibility checks never scan the
//! region list.

use crate::constraint::budget::RegionUsage;
use crate::io::error::{Result, SamplerError};
use crate::spatial::grid::CellCoord;

const NO_REGIONS: &[usize] = &[];

/// Named cell subset with capacity limits, immutable once registered
#[derive(Debug, Clone)]
pub struct Region {
    name: String,
    cells: Vec<CellCoord>,
    max_total: usize,
    max_blue: Option<usize>,
}

impl Region {
    /// Region name as registered
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member cells in registration order
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Cap on colored cells of either species
    pub const fn max_total(&self) -> usize {
        self.max_total
    }

    /// Optional cap on blue cells
    pub const fn max_blue(&self) -> Option<usize> {
        self.max_blue
    }

    /// Number of member cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the region has no members (never true once registered)
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Registry of all regions with a cell-keyed membership table
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    regions: Vec<Region>,
    membership: Vec<Vec<usize>>,
    side: usize,
}

impl RegionRegistry {
    /// Create an empty registry for a grid of the given side length
    ///
    /// An empty registry is valid: cells may be entirely unconstrained.
    pub fn new(side: usize) -> Self {
        Self {
            regions: Vec::new(),
            membership: vec![Vec::new(); side * side],
            side,
        }
    }

    /// Side length of the grid this registry constrains
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Register a region, returning its index
    ///
    /// # Errors
    ///
    /// Returns an error if the cell set is empty, references an out-of-range
    /// or repeated coordinate, the name is already registered, `max_total` is
    /// zero, or `max_blue` exceeds `max_total`.
    pub fn register(
        &mut self,
        name: &str,
        cells: Vec<CellCoord>,
        max_total: usize,
        max_blue: Option<usize>,
    ) -> Result<usize> {
        if cells.is_empty() {
            return Err(SamplerError::InvalidRegion {
                name: name.to_string(),
                reason: "cell set is empty".to_string(),
            });
        }

        if max_total == 0 {
            return Err(SamplerError::InvalidRegion {
                name: name.to_string(),
                reason: "max-total must be positive".to_string(),
            });
        }

        if let Some(blue_cap) = max_blue {
            if blue_cap > max_total {
                return Err(SamplerError::InvalidRegion {
                    name: name.to_string(),
                    reason: format!("max-blue {blue_cap} exceeds max-total {max_total}"),
                });
            }
        }

        if self.regions.iter().any(|region| region.name == name) {
            return Err(SamplerError::InvalidRegion {
                name: name.to_string(),
                reason: "a region with this name is already registered".to_string(),
            });
        }

        let mut seen = vec![false; self.side * self.side];
        for &cell in &cells {
            if cell[0] >= self.side || cell[1] >= self.side {
                return Err(SamplerError::InvalidRegion {
                    name: name.to_string(),
                    reason: format!(
                        "cell ({}, {}) lies outside the {2}×{2} grid",
                        cell[0], cell[1], self.side
                    ),
                });
            }

            let flat = cell[0] * self.side + cell[1];
            if seen.get(flat).copied().unwrap_or(false) {
                return Err(SamplerError::InvalidRegion {
                    name: name.to_string(),
                    reason: format!("cell ({}, {}) appears more than once", cell[0], cell[1]),
                });
            }
            if let Some(mark) = seen.get_mut(flat) {
                *mark = true;
            }
        }

        let index = self.regions.len();
        for &cell in &cells {
            let flat = cell[0] * self.side + cell[1];
            if let Some(entry) = self.membership.get_mut(flat) {
                entry.push(index);
            }
        }

        self.regions.push(Region {
            name: name.to_string(),
            cells,
            max_total,
            max_blue,
        });

        Ok(index)
    }

    /// Indices of every region containing the cell, possibly empty
    pub fn regions_for(&self, cell: CellCoord) -> &[usize] {
        if cell[0] >= self.side || cell[1] >= self.side {
            return NO_REGIONS;
        }

        self.membership
            .get(cell[0] * self.side + cell[1])
            .map_or(NO_REGIONS, Vec::as_slice)
    }

    /// Region by index
    pub fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    /// Number of registered regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no regions are registered
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate registered regions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Capacity left in a region given current usage
    ///
    /// May read negative when usage was produced outside the tracker (for
    /// example from a hand-edited grid); a committed placement never drives
    /// it below zero.
    pub fn remaining_capacity(&self, index: usize, usage: RegionUsage) -> i64 {
        self.region(index)
            .map_or(0, |region| region.max_total() as i64 - usage.total as i64)
    }
}
