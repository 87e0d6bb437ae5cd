//! Page Differ: compares a freshly rendered page against its snapshot.

use super::comparator::{PixelComparator, YiqComparator};
use super::composite::compose_side_by_side;
use crate::raster::RasterPage;
use crate::utils::error::DiffError;
use log::debug;

/// Outcome of comparing two pages of equal size
#[derive(Debug, Clone, PartialEq)]
pub enum PageDiff {
    /// Difference ratio within the threshold
    Matched { diff_ratio: f64 },

    /// Difference ratio above the threshold
    Changed {
        diff_ratio: f64,
        new_page: RasterPage,
        /// reference | diff | received, three times the page width
        diff_visualization: RasterPage,
    },
}

impl PageDiff {
    pub fn diff_ratio(&self) -> f64 {
        match self {
            PageDiff::Matched { diff_ratio } | PageDiff::Changed { diff_ratio, .. } => *diff_ratio,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, PageDiff::Matched { .. })
    }
}

/// Reject thresholds outside [0, 1]
pub fn validate_threshold(threshold: f64) -> Result<(), DiffError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(DiffError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Wraps a pixel comparator with size checks, ratio computation,
/// thresholding and composite assembly.
#[derive(Debug, Clone, Default)]
pub struct PageDiffer<C = YiqComparator> {
    comparator: C,
}

impl<C: PixelComparator> PageDiffer<C> {
    pub fn new(comparator: C) -> Self {
        Self { comparator }
    }

    /// Compare `received` against `reference`.
    ///
    /// # Errors
    /// * `DiffError::SizeMismatch` - If the pages have different dimensions
    /// * `DiffError::InvalidThreshold` - If `threshold` is outside [0, 1]
    pub fn diff(
        &self,
        received: &RasterPage,
        reference: &RasterPage,
        threshold: f64,
    ) -> Result<PageDiff, DiffError> {
        validate_threshold(threshold)?;

        if received.dimensions() != reference.dimensions() {
            return Err(DiffError::SizeMismatch {
                received: received.dimensions(),
                reference: reference.dimensions(),
            });
        }

        let pixel_diff = self.comparator.compare(received, reference)?;

        let total_pixels = received.area();
        let diff_ratio = if total_pixels == 0 {
            0.0
        } else {
            (pixel_diff.diff_pixel_count as f64 / total_pixels as f64).min(1.0)
        };

        debug!(
            "Page diff: {} of {} pixels differ (ratio {:.6}, threshold {})",
            pixel_diff.diff_pixel_count, total_pixels, diff_ratio, threshold
        );

        if diff_ratio <= threshold {
            return Ok(PageDiff::Matched { diff_ratio });
        }

        let diff_visualization =
            compose_side_by_side(reference, &pixel_diff.diff_raster, received);

        Ok(PageDiff::Changed {
            diff_ratio,
            new_page: received.clone(),
            diff_visualization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(1.1).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_zero_area_page_matches() {
        let page = RasterPage::filled(0, 0, [0, 0, 0, 255]);
        let result = PageDiffer::<YiqComparator>::default()
            .diff(&page, &page, 0.0)
            .unwrap();

        assert_eq!(result, PageDiff::Matched { diff_ratio: 0.0 });
    }

    #[test]
    fn test_full_change_ratio_is_one() {
        let a = RasterPage::filled(3, 3, [255, 255, 255, 255]);
        let b = RasterPage::filled(3, 3, [0, 0, 0, 255]);
        let result = PageDiffer::<YiqComparator>::default()
            .diff(&a, &b, 1.0)
            .unwrap();

        assert_eq!(result, PageDiff::Matched { diff_ratio: 1.0 });
    }
}
