//! PNG export of colored facet grids

use image::{ImageBuffer, Rgba};
use std::path::Path;

use crate::io::configuration::{BLUE_RGBA, CELL_PIXEL_SIZE, GREEN_RGBA, UNSET_RGBA};
use crate::io::error::{Result, SamplerError};
use crate::spatial::grid::{Color, FacetGrid};

const fn cell_rgba(color: Color) -> [u8; 4] {
    match color {
        Color::Blue => BLUE_RGBA,
        Color::Green => GREEN_RGBA,
        Color::Unset => UNSET_RGBA,
    }
}

/// Export the grid as a PNG with one filled square per cell
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_grid_as_png(grid: &FacetGrid, output_path: &Path) -> Result<()> {
    let pixels = grid.side() as u32 * CELL_PIXEL_SIZE;
    let mut img = ImageBuffer::new(pixels, pixels);

    for (cell, color) in grid.cells() {
        let rgba = cell_rgba(color);
        let base_x = cell[1] as u32 * CELL_PIXEL_SIZE;
        let base_y = cell[0] as u32 * CELL_PIXEL_SIZE;

        for dy in 0..CELL_PIXEL_SIZE {
            for dx in 0..CELL_PIXEL_SIZE {
                img.put_pixel(base_x + dx, base_y + dy, Rgba(rgba));
            }
        }
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| SamplerError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    img.save(output_path).map_err(|e| SamplerError::ImageExport {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
