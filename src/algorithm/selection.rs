//! Symmetry-aware candidate ranking
//!
//! Orders eligible cells by how close each lies to the point-reflection of the
//! last placed cell through the grid center, steering the pattern toward
//! two-fold symmetry one step at a time. Purely advisory: the ranking never
//! filters by eligibility, and identical inputs always produce the identical
//! order.

use crate::math::distance::{DistanceMetric, center_distance_key, distance_key, point_reflection};
use crate::spatial::grid::CellCoord;

/// Rank candidate cells, most symmetric first
///
/// With a last placed cell, candidates sort by distance to its point
/// reflection, closest first. With no history (the first placement of a run)
/// they sort by distance from the grid center, farthest first, so patterns
/// start at the extremities. Ties always break by lexicographic coordinate
/// order, which makes the ranking a pure function of its inputs.
pub fn rank_candidates(
    candidates: &[CellCoord],
    last_cell: Option<CellCoord>,
    side: usize,
    metric: DistanceMetric,
) -> Vec<CellCoord> {
    let mut ranked = candidates.to_vec();

    match last_cell {
        Some(previous) => {
            let opposite = point_reflection(previous, side);
            ranked.sort_by_key(|&cell| (distance_key(cell, opposite, metric), cell));
        }
        None => {
            ranked.sort_by(|&a, &b| {
                center_distance_key(b, side, metric)
                    .cmp(&center_distance_key(a, side, metric))
                    .then_with(|| a.cmp(&b))
            });
        }
    }

    ranked
}

/// Number of leading candidates tied with the best-ranked cell
///
/// Operates on the output of [`rank_candidates`] with the same arguments.
/// Used by the seeded tie-break, which may only choose within this prefix so
/// the symmetry ranking itself is never overridden.
pub fn leading_tie_count(
    ranked: &[CellCoord],
    last_cell: Option<CellCoord>,
    side: usize,
    metric: DistanceMetric,
) -> usize {
    let Some(&leader) = ranked.first() else {
        return 0;
    };

    let key_of = |cell: CellCoord| -> u64 {
        last_cell.map_or_else(
            || center_distance_key(cell, side, metric),
            |previous| distance_key(cell, point_reflection(previous, side), metric),
        )
    };

    let leader_key = key_of(leader);
    ranked
        .iter()
        .take_while(|&&cell| key_of(cell) == leader_key)
        .count()
}
