//! Input/output operations and error handling

/// Command-line interface and batch execution
pub mod cli;
/// Compiled defaults and palette constants
pub mod configuration;
/// Error types for all operations
pub mod error;
/// PNG export of colored grids
pub mod image;
/// Progress reporting for batch runs
pub mod progress;
/// Placement log export for replay and determinism checks
pub mod replay;
/// TOML run settings
pub mod settings;
