//! Curvature classification of facet grid cells
//!
//! On the physical cube analog a facet cell sits on a corner, an edge, or the
//! flat interior, which determines its local surface curvature. The class of a
//! cell is a pure function of its coordinates and never changes.

use serde::Deserialize;
use std::fmt;

/// Topological category of a grid cell, modeling local surface curvature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurvatureClass {
    /// Both coordinates at a grid extreme: the four corners
    Vertex,
    /// Exactly one coordinate at an extreme: the border without corners
    Edge,
    /// Interior cell with no coordinate at an extreme
    Face,
}

impl CurvatureClass {
    /// Number of curvature classes
    pub const COUNT: usize = 3;

    /// All classes in descending curvature order
    pub const ALL: [Self; Self::COUNT] = [Self::Vertex, Self::Edge, Self::Face];

    /// Stable index for per-class arrays
    pub const fn index(self) -> usize {
        match self {
            Self::Vertex => 0,
            Self::Edge => 1,
            Self::Face => 2,
        }
    }
}

impl fmt::Display for CurvatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Face => "face",
        };
        write!(f, "{label}")
    }
}

/// Default curvature priority: vertices claim blue before edges, edges before faces
pub const DEFAULT_PRIORITY: [CurvatureClass; CurvatureClass::COUNT] = CurvatureClass::ALL;

/// Classify a cell by its grid coordinates
///
/// A coordinate is extreme when it equals `0` or `side - 1`. Two extremes make
/// a vertex, one makes an edge, none makes a face. A 1×1 grid has a single
/// vertex cell; callers are responsible for in-range coordinates.
pub const fn classify(cell: [usize; 2], side: usize) -> CurvatureClass {
    let last = side.saturating_sub(1);
    let row_extreme = cell[0] == 0 || cell[0] == last;
    let col_extreme = cell[1] == 0 || cell[1] == last;

    match (row_extreme, col_extreme) {
        (true, true) => CurvatureClass::Vertex,
        (true, false) | (false, true) => CurvatureClass::Edge,
        (false, false) => CurvatureClass::Face,
    }
}
