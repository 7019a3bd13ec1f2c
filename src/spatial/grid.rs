//! Facet grid state with per-cell colors and precomputed curvature classes
//!
//! The grid owns the full N×N collection of cells. Curvature classes are
//! derived once at construction and never change; colors are mutated solely by
//! the placement sampler through its commit and rollback paths, except when a
//! caller assembles a grid by hand for standalone validation.

use ndarray::Array2;

use crate::io::error::{Result, invalid_parameter};
use crate::spatial::topology::{CurvatureClass, classify};

/// Coordinate pair (row, column) identifying one grid cell
pub type CellCoord = [usize; 2];

/// Chemical species label assigned to a grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    /// No species assigned yet
    #[default]
    Unset,
    /// Hydrophilic species
    Green,
    /// Hydrophobic species
    Blue,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unset => "unset",
            Self::Green => "green",
            Self::Blue => "blue",
        };
        write!(f, "{label}")
    }
}

/// Square facet grid holding cell colors and curvature classes
#[derive(Debug, Clone)]
pub struct FacetGrid {
    colors: Array2<Color>,
    classes: Array2<CurvatureClass>,
    class_sizes: [usize; CurvatureClass::COUNT],
    side: usize,
}

impl FacetGrid {
    /// Create an uncolored grid with the given side length
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is zero.
    pub fn new(side: usize) -> Result<Self> {
        if side == 0 {
            return Err(invalid_parameter(
                "side",
                &side,
                &"grid side must be at least 1",
            ));
        }

        let colors = Array2::from_elem((side, side), Color::Unset);
        let classes = Array2::from_shape_fn((side, side), |(row, col)| classify([row, col], side));

        let mut class_sizes = [0; CurvatureClass::COUNT];
        for class in classes.iter() {
            if let Some(size) = class_sizes.get_mut(class.index()) {
                *size += 1;
            }
        }

        Ok(Self {
            colors,
            classes,
            class_sizes,
            side,
        })
    }

    /// Side length of the grid
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Total number of cells
    pub const fn len(&self) -> usize {
        self.side * self.side
    }

    /// Whether the grid has no cells (never true for a constructed grid)
    pub const fn is_empty(&self) -> bool {
        self.side == 0
    }

    /// Color of a cell, or `None` when the coordinate is out of range
    pub fn color(&self, cell: CellCoord) -> Option<Color> {
        self.colors.get([cell[0], cell[1]]).copied()
    }

    /// Curvature class of a cell, or `None` when the coordinate is out of range
    pub fn class_of(&self, cell: CellCoord) -> Option<CurvatureClass> {
        self.classes.get([cell[0], cell[1]]).copied()
    }

    /// Number of cells in a curvature class
    pub fn class_size(&self, class: CurvatureClass) -> usize {
        self.class_sizes.get(class.index()).copied().unwrap_or(0)
    }

    /// Assign a color to a cell, overwriting any previous value
    ///
    /// During a sampler run only the commit and rollback paths call this;
    /// callers preparing a grid for standalone validation may also use it.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinate is out of range.
    pub fn paint(&mut self, cell: CellCoord, color: Color) -> Result<()> {
        match self.colors.get_mut([cell[0], cell[1]]) {
            Some(slot) => {
                *slot = color;
                Ok(())
            }
            None => Err(invalid_parameter(
                "cell",
                &format!("({}, {})", cell[0], cell[1]),
                &format!("coordinate outside {0}×{0} grid", self.side),
            )),
        }
    }

    /// Iterate all cells in row-major order with their colors
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, Color)> + '_ {
        self.colors
            .indexed_iter()
            .map(|((row, col), &color)| ([row, col], color))
    }

    /// Uncolored cells of one curvature class in row-major order
    pub fn uncolored_in_class(&self, class: CurvatureClass) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        for row in 0..self.side {
            for col in 0..self.side {
                let color = self.colors.get([row, col]).copied().unwrap_or(Color::Unset);
                if color == Color::Unset && self.classes.get([row, col]) == Some(&class) {
                    cells.push([row, col]);
                }
            }
        }
        cells
    }

    /// Count of colored cells in one curvature class
    pub fn colored_in_class(&self, class: CurvatureClass) -> usize {
        let mut count = 0;
        for row in 0..self.side {
            for col in 0..self.side {
                let color = self.colors.get([row, col]).copied().unwrap_or(Color::Unset);
                if color != Color::Unset && self.classes.get([row, col]) == Some(&class) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Count of cells currently holding the given color
    pub fn count_of(&self, color: Color) -> usize {
        self.colors.iter().filter(|&&c| c == color).count()
    }
}
