use crate::algorithm::record::{Placement, PlacementLog};
use crate::constraint::budget::BudgetTracker;
use crate::constraint::regions::RegionRegistry;
use crate::io::error::Result;
use crate::spatial::grid::{Color, FacetGrid};

/// Placements undone by one backtracking step
#[derive(Debug)]
pub struct RewindResult {
    /// Undone placements, most recent first
    pub undone: Vec<Placement>,
}

/// Roll back the most recent placements to escape a starved state
///
/// Pops up to `depth` placements from the tail of the log, reversing each
/// through the budget tracker and clearing its cell on the grid. The caller
/// excludes the returned cells from the retried selection so the sampler does
/// not immediately recreate the state it just escaped.
///
/// # Errors
///
/// Returns an invariant violation if a popped placement cannot be reversed,
/// meaning the log and the tracker have diverged.
pub fn rewind_recent_placements(
    grid: &mut FacetGrid,
    tracker: &mut BudgetTracker,
    registry: &RegionRegistry,
    log: &mut PlacementLog,
    depth: usize,
) -> Result<RewindResult> {
    let mut undone = Vec::with_capacity(depth);

    for _ in 0..depth {
        let Some(placement) = log.pop() else {
            break;
        };

        tracker.rollback(registry, placement.cell, placement.color)?;
        grid.paint(placement.cell, Color::Unset)?;
        undone.push(placement);
    }

    Ok(RewindResult { undone })
}
