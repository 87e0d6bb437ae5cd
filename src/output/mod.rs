//! Output writers for match reports and page images.
//!
//! This module handles writing data to disk in various formats:
//! - JSON match reports
//! - PNG page images and review composites
//! - Colored terminal summaries

pub mod json;
pub mod terminal;

// Re-export main functions
pub use json::{read_report, write_report, PageEntry, ReportFile};
pub use terminal::render_terminal_report;

use crate::raster::RasterPage;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Create missing parent directories of an output file
pub(crate) fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// Write a page image as PNG
pub fn write_png(page: &RasterPage, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    validate_path(output_path)?;
    ensure_parent(output_path)?;

    let png = page
        .to_png()
        .map_err(|e| OutputError::InvalidPath(format!("Cannot encode image: {}", e)))?;
    std::fs::write(output_path, &png)?;

    info!(
        "PNG written to: {} ({}x{}, {} bytes)",
        output_path.display(),
        page.width(),
        page.height(),
        png.len()
    );

    Ok(())
}
