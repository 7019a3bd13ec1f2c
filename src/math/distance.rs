use serde::Deserialize;

/// Distance metric used when ranking candidate cells
///
/// Euclidean distances are compared through their squares so that every
/// comparison stays in integer arithmetic and ranking remains exactly
/// reproducible across platforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMetric {
    /// Straight-line distance, compared by its square
    #[default]
    Euclidean,
    /// Chessboard distance: the maximum coordinate difference
    Chebyshev,
}

/// Point-reflection of a cell through the grid center
///
/// Maps `(r, c)` to `(side - 1 - r, side - 1 - c)`, the geometric opposite on
/// the facet. Callers must pass in-range coordinates.
pub const fn point_reflection(cell: [usize; 2], side: usize) -> [usize; 2] {
    [
        side.saturating_sub(1).saturating_sub(cell[0]),
        side.saturating_sub(1).saturating_sub(cell[1]),
    ]
}

/// Comparable distance between two cells under the chosen metric
///
/// Returns the squared Euclidean distance or the Chebyshev distance. The two
/// scales are never mixed within one ranking, so each is a valid sort key.
pub const fn distance_key(a: [usize; 2], b: [usize; 2], metric: DistanceMetric) -> u64 {
    let dr = a[0].abs_diff(b[0]) as u64;
    let dc = a[1].abs_diff(b[1]) as u64;

    match metric {
        DistanceMetric::Euclidean => dr * dr + dc * dc,
        DistanceMetric::Chebyshev => {
            if dr > dc { dr } else { dc }
        }
    }
}

/// Comparable distance from a cell to the grid center under the chosen metric
///
/// Works on coordinates doubled so the center of an even-sided grid stays on
/// the integer lattice: cell `(r, c)` becomes `(2r, 2c)` and the center is at
/// `(side - 1, side - 1)`.
pub const fn center_distance_key(cell: [usize; 2], side: usize, metric: DistanceMetric) -> u64 {
    let center = side.saturating_sub(1);
    let dr = (2 * cell[0]).abs_diff(center) as u64;
    let dc = (2 * cell[1]).abs_diff(center) as u64;

    match metric {
        DistanceMetric::Euclidean => dr * dr + dc * dc,
        DistanceMetric::Chebyshev => {
            if dr > dc { dr } else { dc }
        }
    }
}
