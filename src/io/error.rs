//! Error types for configuration, sampling, and export operations

use std::fmt;
use std::path::PathBuf;

use crate::spatial::grid::CellCoord;

/// Main error type for all sampler operations
#[derive(Debug)]
pub enum SamplerError {
    /// A region definition failed validation at registration
    InvalidRegion {
        /// Name of the offending region
        name: String,
        /// Explanation of what is wrong with the definition
        reason: String,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A commit or rollback that the tracker's own checks reject
    ///
    /// Signals a sampler bug rather than a data condition: the caller is
    /// required to check eligibility before committing, so this is never
    /// recovered from.
    InvariantViolation {
        /// Operation that was attempted
        operation: &'static str,
        /// Cell involved in the operation
        cell: CellCoord,
        /// Explanation of the broken invariant
        reason: String,
    },

    /// A settings file could not be read or parsed
    SettingsLoad {
        /// Path to the settings file
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Failed to save a rendered grid to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegion { name, reason } => {
                write!(f, "Invalid region '{name}': {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvariantViolation {
                operation,
                cell,
                reason,
            } => {
                write!(
                    f,
                    "Invariant violation during {operation} at ({}, {}): {reason}",
                    cell[0], cell[1]
                )
            }
            Self::SettingsLoad { path, reason } => {
                write!(f, "Failed to load settings '{}': {reason}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SamplerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileSystem { source, .. } => Some(source),
            Self::ImageExport { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for sampler results
pub type Result<T> = std::result::Result<T, SamplerError>;

impl From<std::io::Error> for SamplerError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> SamplerError {
    SamplerError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
