//! Placement log export for replay and cross-run determinism checks

use std::fmt::Write as _;
use std::path::Path;

use crate::algorithm::record::PlacementLog;
use crate::io::error::{Result, SamplerError};

/// Render the placement log as one line per commit
///
/// Each line is `index,row,col,color,class`. Two runs are reproducible
/// exactly when their rendered logs compare byte-identical.
pub fn render_placement_log(log: &PlacementLog) -> String {
    let mut text = String::new();

    for (index, placement) in log.entries().iter().enumerate() {
        let _ = writeln!(
            text,
            "{index},{},{},{},{}",
            placement.cell[0], placement.cell[1], placement.color, placement.class
        );
    }

    text
}

/// Write the rendered placement log to a file
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_placement_log(log: &PlacementLog, path: &Path) -> Result<()> {
    std::fs::write(path, render_placement_log(log)).map_err(|e| SamplerError::FileSystem {
        path: path.to_path_buf(),
        operation: "write placement log",
        source: e,
    })
}
