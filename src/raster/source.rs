//! Raster sources turn a document into an ordered sequence of page images.
//!
//! The only bundled backend drives poppler's `pdftoppm` utility, which must
//! be installed separately (or pointed to with `POPPLER_BIN`).

use super::page::RasterPage;
use crate::utils::config::{DEFAULT_POPPLER_BIN, DEFAULT_SCALE, POINTS_PER_INCH};
use crate::utils::error::RenderError;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Options for rasterizing a document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Output scale, 1.0 = one pixel per PDF point
    pub scale: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

impl RenderOptions {
    pub fn with_scale(scale: f64) -> Self {
        Self { scale }
    }

    /// Reject non-positive or non-finite scales
    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RenderError::InvalidScale(self.scale));
        }
        Ok(())
    }
}

/// Converts a document into pages, preserving document page order.
pub trait RasterSource: Send + Sync {
    fn render(
        &self,
        document: &[u8],
        options: &RenderOptions,
    ) -> Result<Vec<RasterPage>, RenderError>;
}

/// Rasterizer backed by poppler's `pdftoppm`
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    bin: PathBuf,
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_POPPLER_BIN)
    }
}

impl PopplerRasterizer {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Use `POPPLER_BIN` when set, `pdftoppm` from `PATH` otherwise
    pub fn from_env() -> Self {
        match std::env::var_os("POPPLER_BIN") {
            Some(bin) => Self::new(bin),
            None => Self::default(),
        }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }
}

impl RasterSource for PopplerRasterizer {
    fn render(
        &self,
        document: &[u8],
        options: &RenderOptions,
    ) -> Result<Vec<RasterPage>, RenderError> {
        options.validate()?;
        check_pdf_header(document)?;

        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("document.pdf");
        fs::write(&input, document)?;

        let dpi = POINTS_PER_INCH * options.scale;
        let prefix = workdir.path().join("page");

        debug!(
            "Running {} at {:.1} dpi on {} bytes",
            self.bin.display(),
            dpi,
            document.len()
        );

        let output = Command::new(&self.bin)
            .arg("-png")
            .arg("-r")
            .arg(format!("{}", dpi))
            .arg(&input)
            .arg(&prefix)
            .output()
            .map_err(|source| RenderError::BackendUnavailable {
                bin: self.bin.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Backend(format!(
                "{} exited with {}: {}",
                self.bin.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let files = collect_page_files(workdir.path(), "page")?;
        let mut pages = Vec::with_capacity(files.len());
        for file in files {
            pages.push(RasterPage::from_png(&fs::read(&file)?)?);
        }

        info!("Pdf document rasterized: {} page(s)", pages.len());

        Ok(pages)
    }
}

/// Cheap sanity check before spawning the backend
fn check_pdf_header(document: &[u8]) -> Result<(), RenderError> {
    if document.is_empty() {
        return Err(RenderError::Malformed("document is empty".to_string()));
    }

    // The header may be preceded by up to 1024 bytes of junk
    let head = &document[..document.len().min(1024)];
    if !head.windows(5).any(|w| w == b"%PDF-") {
        return Err(RenderError::Malformed("missing %PDF- header".to_string()));
    }

    Ok(())
}

/// List `<prefix>-<n>.png` files sorted by page number.
///
/// pdftoppm zero-pads the page number to the width of the page count, so the
/// number is parsed rather than sorted lexically.
fn collect_page_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, RenderError> {
    let mut numbered = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(number) = page_number(name, prefix) {
            numbered.push((number, path));
        }
    }

    numbered.sort_by_key(|(number, _)| *number);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

fn page_number(file_name: &str, prefix: &str) -> Option<u32> {
    file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_validation() {
        assert!(RenderOptions::default().validate().is_ok());
        assert!(RenderOptions::with_scale(0.0).validate().is_err());
        assert!(RenderOptions::with_scale(-1.0).validate().is_err());
        assert!(RenderOptions::with_scale(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_pdf_header_check() {
        assert!(check_pdf_header(b"%PDF-1.7\n...").is_ok());
        assert!(check_pdf_header(b"\n\n%PDF-1.4").is_ok());
        assert!(check_pdf_header(b"").is_err());
        assert!(check_pdf_header(b"<html>").is_err());
    }

    #[test]
    fn test_page_number_parsing() {
        assert_eq!(page_number("page-1.png", "page"), Some(1));
        assert_eq!(page_number("page-010.png", "page"), Some(10));
        assert_eq!(page_number("page.png", "page"), None);
        assert_eq!(page_number("document.pdf", "page"), None);
    }

    #[test]
    fn test_collect_page_files_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-02.png", "page-1.png", "document.pdf"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = collect_page_files(dir.path(), "page").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["page-1.png", "page-02.png", "page-10.png"]);
    }

    #[test]
    fn test_malformed_input_fails_before_spawning() {
        let rasterizer = PopplerRasterizer::new("/nonexistent/pdftoppm");
        let err = rasterizer
            .render(b"hello", &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::Malformed(_)));
    }

    #[test]
    fn test_missing_backend_reported() {
        let rasterizer = PopplerRasterizer::new("/nonexistent/pdftoppm");
        let err = rasterizer
            .render(b"%PDF-1.4\n", &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::BackendUnavailable { .. }));
    }
}
