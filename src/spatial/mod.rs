//! Spatial data structures for the facet surface
//!
//! This module contains spatial-related functionality including:
//! - Facet grid state and color bookkeeping
//! - Curvature topology classification

/// Facet grid state and color management
pub mod grid;
/// Curvature class derivation from grid coordinates
pub mod topology;

pub use grid::FacetGrid;
pub use topology::CurvatureClass;
