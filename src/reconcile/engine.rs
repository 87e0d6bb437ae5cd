//! Snapshot Reconciler: aligns rendered pages with stored snapshots by
//! ordinal position and classifies every position.
//!
//! Alignment is strictly positional. Inserting a page in the middle of a
//! document shifts every later ordinal and shows up as a run of changed
//! pages, not as one added page.

use super::outcome::{DiffOutcome, MatchReport};
use crate::diff::{validate_threshold, PageDiffer, PixelComparator, YiqComparator};
use crate::raster::RasterPage;
use crate::utils::error::DiffError;
use log::{debug, info};
use rayon::prelude::*;

#[derive(Debug, Clone, Default)]
pub struct Reconciler<C = YiqComparator> {
    differ: PageDiffer<C>,
}

impl<C: PixelComparator> Reconciler<C> {
    pub fn new(differ: PageDiffer<C>) -> Self {
        Self { differ }
    }

    /// Classify every ordinal in `1..=max(rendered, stored)`.
    ///
    /// Ordinals are evaluated in parallel; the report keeps ordinal order.
    ///
    /// # Errors
    /// * `DiffError::InvalidThreshold` - If `threshold` is outside [0, 1]
    /// * `DiffError::SizeMismatch` - If any paired pages differ in size; the
    ///   whole reconciliation is abandoned
    pub fn reconcile(
        &self,
        rendered: &[RasterPage],
        stored: &[RasterPage],
        threshold: f64,
    ) -> Result<MatchReport, DiffError> {
        validate_threshold(threshold)?;

        let count = rendered.len().max(stored.len());
        debug!(
            "Reconciling {} rendered page(s) against {} snapshot(s)",
            rendered.len(),
            stored.len()
        );

        let outcomes = (0..count)
            .into_par_iter()
            .map(|index| self.resolve(rendered.get(index), stored.get(index), threshold))
            .collect::<Result<Vec<_>, _>>()?;

        let report = MatchReport::new(outcomes);
        info!("Reconciled {}", report.summary().summary());

        Ok(report)
    }

    fn resolve(
        &self,
        rendered: Option<&RasterPage>,
        stored: Option<&RasterPage>,
        threshold: f64,
    ) -> Result<DiffOutcome, DiffError> {
        match (rendered, stored) {
            (None, _) => Ok(DiffOutcome::Deleted),
            (Some(page), None) => Ok(DiffOutcome::Added {
                new_page: page.clone(),
            }),
            (Some(page), Some(snapshot)) => {
                Ok(self.differ.diff(page, snapshot, threshold)?.into())
            }
        }
    }
}
