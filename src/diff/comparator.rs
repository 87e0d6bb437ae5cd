//! Pixel-level comparison of two equally sized rasters.
//!
//! The default comparator measures perceptual distance in the YIQ color
//! space and ignores pixels that look like anti-aliasing on either side,
//! so sub-pixel rendering jitter between rasterizer runs does not count.

use crate::raster::RasterPage;
use crate::utils::config::DEFAULT_PIXEL_TOLERANCE;
use crate::utils::error::DiffError;
use image::{Rgba, RgbaImage};

// Maximum possible squared YIQ delta between two colors
const MAX_YIQ_DELTA: f64 = 35215.0;

const DIFF_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const AA_COLOR: Rgba<u8> = Rgba([255, 255, 0, 255]);
const UNCHANGED_ALPHA: f64 = 0.1;

/// Result of a pixel comparison
#[derive(Debug, Clone, PartialEq)]
pub struct PixelDiff {
    /// Pixels whose distance exceeds the tolerance
    pub diff_pixel_count: u64,

    /// Same size as the inputs; differing pixels highlighted
    pub diff_raster: RasterPage,
}

/// Counts differing pixels between two rasters of identical dimensions.
pub trait PixelComparator: Send + Sync {
    fn compare(&self, a: &RasterPage, b: &RasterPage) -> Result<PixelDiff, DiffError>;
}

/// Perceptual comparator with anti-aliasing detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YiqComparator {
    /// Normalized color distance tolerance in [0, 1]
    pub tolerance: f64,

    /// Count anti-aliased pixels as differences too
    pub include_anti_aliasing: bool,
}

impl Default for YiqComparator {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_PIXEL_TOLERANCE,
            include_anti_aliasing: false,
        }
    }
}

impl PixelComparator for YiqComparator {
    fn compare(&self, a: &RasterPage, b: &RasterPage) -> Result<PixelDiff, DiffError> {
        if a.dimensions() != b.dimensions() {
            return Err(DiffError::SizeMismatch {
                received: a.dimensions(),
                reference: b.dimensions(),
            });
        }

        let (width, height) = a.dimensions();
        let img1 = a.as_image();
        let img2 = b.as_image();
        let mut output = RgbaImage::new(width, height);

        // Identical buffers: paint the faded background and stop
        if img1.as_raw() == img2.as_raw() {
            for (x, y, pixel) in img1.enumerate_pixels() {
                output.put_pixel(x, y, faded_gray(pixel));
            }
            return Ok(PixelDiff {
                diff_pixel_count: 0,
                diff_raster: RasterPage::from(output),
            });
        }

        let max_delta = MAX_YIQ_DELTA * self.tolerance * self.tolerance;
        let mut diff_pixel_count = 0u64;

        for y in 0..height {
            for x in 0..width {
                let p1 = img1.get_pixel(x, y);
                let p2 = img2.get_pixel(x, y);
                let delta = color_delta(p1, p2, false);

                if delta.abs() > max_delta {
                    let anti_aliased = !self.include_anti_aliasing
                        && (is_anti_aliased(img1, x, y, img2) || is_anti_aliased(img2, x, y, img1));

                    if anti_aliased {
                        output.put_pixel(x, y, AA_COLOR);
                    } else {
                        output.put_pixel(x, y, DIFF_COLOR);
                        diff_pixel_count += 1;
                    }
                } else {
                    output.put_pixel(x, y, faded_gray(p1));
                }
            }
        }

        Ok(PixelDiff {
            diff_pixel_count,
            diff_raster: RasterPage::from(output),
        })
    }
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94
}

/// Blend a channel over white
fn blend(channel: f64, alpha: f64) -> f64 {
    255.0 + (channel - 255.0) * alpha
}

fn blended_rgb(pixel: &Rgba<u8>) -> (f64, f64, f64) {
    let [r, g, b, a] = pixel.0;
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    if a == 255 {
        return (r, g, b);
    }
    let alpha = f64::from(a) / 255.0;
    (blend(r, alpha), blend(g, alpha), blend(b, alpha))
}

/// Squared YIQ distance between two pixels.
///
/// Negative when the first pixel is brighter. With `brightness_only` the
/// signed luma difference is returned instead.
fn color_delta(p1: &Rgba<u8>, p2: &Rgba<u8>, brightness_only: bool) -> f64 {
    if p1 == p2 {
        return 0.0;
    }

    let (r1, g1, b1) = blended_rgb(p1);
    let (r2, g2, b2) = blended_rgb(p2);

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if brightness_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 {
        -delta
    } else {
        delta
    }
}

fn faded_gray(pixel: &Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    let luma = rgb2y(f64::from(r), f64::from(g), f64::from(b));
    let value = blend(luma, UNCHANGED_ALPHA * f64::from(a) / 255.0)
        .round()
        .clamp(0.0, 255.0) as u8;
    Rgba([value, value, value, 255])
}

/// 3x3 neighbourhood bounds clamped to the image
fn neighbourhood(x: u32, y: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
    (
        x.saturating_sub(1),
        y.saturating_sub(1),
        (x + 1).min(width - 1),
        (y + 1).min(height - 1),
    )
}

/// Whether a pixel sits on an anti-aliased edge: it has few identical
/// neighbours, and both its darkest and brightest neighbours belong to flat
/// regions in both images.
fn is_anti_aliased(img: &RgbaImage, x1: u32, y1: u32, other: &RgbaImage) -> bool {
    let (width, height) = img.dimensions();
    let (x0, y0, x2, y2) = neighbourhood(x1, y1, width, height);
    let center = img.get_pixel(x1, y1);

    let mut zeroes = u32::from(x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2);
    let mut min = 0.0;
    let mut max = 0.0;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0, 0, 0, 0);

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }

            let delta = color_delta(center, img.get_pixel(x, y), true);

            if delta == 0.0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_x = x;
                min_y = y;
            } else if delta > max {
                max = delta;
                max_x = x;
                max_y = y;
            }
        }
    }

    // No darker or no brighter neighbour: not an edge
    if min == 0.0 || max == 0.0 {
        return false;
    }

    (has_many_siblings(img, min_x, min_y) && has_many_siblings(other, min_x, min_y))
        || (has_many_siblings(img, max_x, max_y) && has_many_siblings(other, max_x, max_y))
}

/// More than two identical neighbours around (x1, y1)
fn has_many_siblings(img: &RgbaImage, x1: u32, y1: u32) -> bool {
    let (width, height) = img.dimensions();
    let (x0, y0, x2, y2) = neighbourhood(x1, y1, width, height);
    let center = img.get_pixel(x1, y1);

    let mut zeroes = u32::from(x1 == x0 || x1 == x2 || y1 == y0 || y1 == y2);

    for x in x0..=x2 {
        for y in y0..=y2 {
            if x == x1 && y == y1 {
                continue;
            }
            if img.get_pixel(x, y) == center {
                zeroes += 1;
                if zeroes > 2 {
                    return true;
                }
            }
        }
    }

    false
}
