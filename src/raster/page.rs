//! In-memory page raster and its PNG / base64 encodings.

use crate::utils::error::ImageError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// One rendered page: an immutable RGBA8 pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    image: RgbaImage,
}

impl RasterPage {
    /// Wrap raw RGBA bytes (row-major, 4 bytes per pixel)
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageError> {
        let len = pixels.len();
        RgbaImage::from_raw(width, height, pixels)
            .filter(|_| len == width as usize * height as usize * 4)
            .map(Self::from)
            .ok_or(ImageError::InvalidBuffer { width, height, len })
    }

    /// Page of a single solid color
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    /// Decode a PNG of any color type into RGBA8
    pub fn from_png(bytes: &[u8]) -> Result<Self, ImageError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(ImageError::Decode)?;
        Ok(Self::from(image.to_rgba8()))
    }

    /// Encode as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(ImageError::Encode)?;
        Ok(buffer.into_inner())
    }

    /// Decode a base64 PNG, with or without a `data:image/png;base64,` prefix
    pub fn from_base64(encoded: &str) -> Result<Self, ImageError> {
        Self::from_png(&decode_base64(encoded)?)
    }

    /// Encode as a base64 PNG (no data-URL prefix)
    pub fn to_base64(&self) -> Result<String, ImageError> {
        Ok(STANDARD.encode(self.to_png()?))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Total number of pixels
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Raw RGBA bytes
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}

impl From<RgbaImage> for RasterPage {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

/// Decode a base64 payload, tolerating a PNG data-URL prefix
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, ImageError> {
    let payload = encoded.trim();
    let payload = payload.strip_prefix(DATA_URL_PREFIX).unwrap_or(payload);
    Ok(STANDARD.decode(payload)?)
}

/// Encode bytes as standard padded base64
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Format a PNG as a data URL, handy for embedding in HTML reports
pub fn png_data_url(png: &[u8]) -> String {
    format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(png))
}
