//! Constrained heuristic placement sampler for nanostructured facet coloring
//!
//! The system assigns hydrophobic ("blue") and hydrophilic ("green") species to
//! the cells of a square facet grid, one placement at a time, balancing curvature
//! priority, per-region capacity, global color budgets, and point-reflection
//! symmetry while guaranteeing termination even under conflicting constraints.

#![forbid(unsafe_code)]

/// Core placement loop including candidate ranking, backtracking, and the audit trail
pub mod algorithm;
/// Region capacities, color budgets, and outcome validation
pub mod constraint;
/// Input/output operations and error handling
pub mod io;
/// Distance metrics and point-reflection geometry
pub mod math;
/// Facet grid state and curvature topology
pub mod spatial;

pub use io::error::{Result, SamplerError};
