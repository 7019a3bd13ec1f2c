//! Mathematical utilities for the algorithm

/// Grid distance metrics and point-reflection geometry
pub mod distance;
