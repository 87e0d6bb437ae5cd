//! Side-by-side composite used to review a changed page.

use crate::raster::RasterPage;
use image::imageops;
use image::RgbaImage;

/// Place `reference | diff | received` next to each other.
///
/// All three inputs share the page dimensions; the result is three times as
/// wide and equally tall.
pub fn compose_side_by_side(
    reference: &RasterPage,
    diff: &RasterPage,
    received: &RasterPage,
) -> RasterPage {
    let (width, height) = received.dimensions();
    let mut canvas = RgbaImage::new(width * 3, height);

    for (band, page) in [reference, diff, received].into_iter().enumerate() {
        imageops::replace(
            &mut canvas,
            page.as_image(),
            i64::from(width) * band as i64,
            0,
        );
    }

    RasterPage::from(canvas)
}
