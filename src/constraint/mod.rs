//! Capacity constraints and outcome classification
//!
//! Regions and budgets are constructed once from configuration and stay
//! read-only for the rest of a run; only the budget tracker's counters move,
//! and only through the sampler's commit and rollback paths.

/// Global and per-region color accounting
pub mod budget;
/// Named cell subsets with capacity limits
pub mod regions;
/// Post-run constraint checking and outcome classification
pub mod validate;
