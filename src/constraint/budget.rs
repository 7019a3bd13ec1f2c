//! Global and per-region color accounting with commit and rollback
//!
//! The tracker is the only component that mutates placement counters. Counters
//! move forward on commit and backward on rollback, never past a configured
//! ceiling and never below zero; a commit that `can_place` would reject is a
//! sampler bug and fails fatally rather than being absorbed.

use crate::constraint::regions::RegionRegistry;
use crate::io::error::{Result, SamplerError};
use crate::spatial::grid::{CellCoord, Color};

/// Global ceilings on the number of cells per color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBudget {
    /// Maximum number of blue cells across the grid
    pub blue_max: usize,
    /// Optional maximum number of green cells across the grid
    pub green_max: Option<usize>,
}

/// Colored-cell counts for one region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionUsage {
    /// Colored cells of either species in the region
    pub total: usize,
    /// Blue cells in the region
    pub blue: usize,
}

/// Tracks global and per-region counts against configured limits
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    budget: ColorBudget,
    blue_used: usize,
    green_used: usize,
    region_usage: Vec<RegionUsage>,
}

impl BudgetTracker {
    /// Create a tracker with all counters at zero
    pub fn new(budget: ColorBudget, region_count: usize) -> Self {
        Self {
            budget,
            blue_used: 0,
            green_used: 0,
            region_usage: vec![RegionUsage::default(); region_count],
        }
    }

    /// Configured global ceilings
    pub const fn budget(&self) -> &ColorBudget {
        &self.budget
    }

    /// Blue cells committed so far
    pub const fn blue_used(&self) -> usize {
        self.blue_used
    }

    /// Green cells committed so far
    pub const fn green_used(&self) -> usize {
        self.green_used
    }

    /// Blue placements still available under the global ceiling
    pub const fn blue_remaining(&self) -> usize {
        self.budget.blue_max.saturating_sub(self.blue_used)
    }

    /// Usage counters for a region, zero when the index is unknown
    pub fn usage(&self, region_index: usize) -> RegionUsage {
        self.region_usage
            .get(region_index)
            .copied()
            .unwrap_or_default()
    }

    /// Whether placing `color` at `cell` honors every limit
    ///
    /// All constraints combine as a conjunction: the global ceiling for the
    /// color and, for every region containing the cell, its total capacity
    /// and its blue capacity. `Color::Unset` is never placeable.
    pub fn can_place(&self, registry: &RegionRegistry, cell: CellCoord, color: Color) -> bool {
        match color {
            Color::Unset => return false,
            Color::Blue => {
                if self.blue_used >= self.budget.blue_max {
                    return false;
                }
            }
            Color::Green => {
                if let Some(green_max) = self.budget.green_max {
                    if self.green_used >= green_max {
                        return false;
                    }
                }
            }
        }

        for &region_index in registry.regions_for(cell) {
            let Some(region) = registry.region(region_index) else {
                continue;
            };
            let usage = self.usage(region_index);

            if usage.total >= region.max_total() {
                return false;
            }

            if color == Color::Blue {
                if let Some(max_blue) = region.max_blue() {
                    if usage.blue >= max_blue {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Apply a placement, incrementing the global and region counters
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if the placement would exceed a limit;
    /// callers must check `can_place` first, so this signals a bug.
    pub fn commit(&mut self, registry: &RegionRegistry, cell: CellCoord, color: Color) -> Result<()> {
        if !self.can_place(registry, cell, color) {
            return Err(SamplerError::InvariantViolation {
                operation: "commit",
                cell,
                reason: format!("placement of {color} rejected by a limit that was not rechecked"),
            });
        }

        match color {
            Color::Blue => self.blue_used += 1,
            Color::Green => self.green_used += 1,
            Color::Unset => {}
        }

        for &region_index in registry.regions_for(cell) {
            if let Some(usage) = self.region_usage.get_mut(region_index) {
                usage.total += 1;
                if color == Color::Blue {
                    usage.blue += 1;
                }
            }
        }

        Ok(())
    }

    /// Reverse a prior commit, decrementing the same counters
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if any affected counter is already
    /// zero, meaning the rollback does not mirror a real commit.
    pub fn rollback(
        &mut self,
        registry: &RegionRegistry,
        cell: CellCoord,
        color: Color,
    ) -> Result<()> {
        let underflow = match color {
            Color::Blue => self.blue_used == 0,
            Color::Green => self.green_used == 0,
            Color::Unset => true,
        } || registry.regions_for(cell).iter().any(|&region_index| {
            let usage = self.usage(region_index);
            usage.total == 0 || (color == Color::Blue && usage.blue == 0)
        });

        if underflow {
            return Err(SamplerError::InvariantViolation {
                operation: "rollback",
                cell,
                reason: format!("no committed {color} placement to reverse"),
            });
        }

        match color {
            Color::Blue => self.blue_used -= 1,
            Color::Green => self.green_used -= 1,
            Color::Unset => {}
        }

        for &region_index in registry.regions_for(cell) {
            if let Some(usage) = self.region_usage.get_mut(region_index) {
                usage.total -= 1;
                if color == Color::Blue {
                    usage.blue -= 1;
                }
            }
        }

        Ok(())
    }
}
