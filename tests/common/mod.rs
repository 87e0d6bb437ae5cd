#![allow(dead_code)]

use pdf_snapshot::raster::{RasterPage, RasterSource, RenderOptions};
use pdf_snapshot::utils::error::RenderError;
use std::sync::Mutex;

pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Minimal bytes accepted by the fake rasterizer
pub const PDF: &[u8] = b"%PDF-1.7\n%fake document\n";

pub fn blank(width: u32, height: u32) -> RasterPage {
    RasterPage::filled(width, height, WHITE)
}

/// White page whose first `rows` rows are black
pub fn banded(width: u32, height: u32, rows: u32) -> RasterPage {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let color = if y < rows { BLACK } else { WHITE };
        for _ in 0..width {
            pixels.extend_from_slice(&color);
        }
    }
    RasterPage::from_rgba(width, height, pixels).unwrap()
}

/// Rasterizer returning fixed pages for anything that looks like a PDF
#[derive(Debug, Default)]
pub struct FakeRasterizer {
    pages: Vec<RasterPage>,
    last_scale: Mutex<Option<f64>>,
}

impl FakeRasterizer {
    pub fn new(pages: Vec<RasterPage>) -> Self {
        Self {
            pages,
            last_scale: Mutex::new(None),
        }
    }

    pub fn last_scale(&self) -> Option<f64> {
        *self.last_scale.lock().unwrap()
    }
}

impl RasterSource for FakeRasterizer {
    fn render(
        &self,
        document: &[u8],
        options: &RenderOptions,
    ) -> Result<Vec<RasterPage>, RenderError> {
        options.validate()?;
        if !document.starts_with(b"%PDF") {
            return Err(RenderError::Malformed("missing %PDF header".to_string()));
        }
        *self.last_scale.lock().unwrap() = Some(options.scale);
        Ok(self.pages.clone())
    }
}
