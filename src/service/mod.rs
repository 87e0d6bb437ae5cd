//! Match processing: render a document, reconcile it against snapshots.
//!
//! [`MatchEngine`] is the seam between the matcher and whatever does the
//! work: [`LocalEngine`] renders and compares in-process, while
//! [`crate::rpc::RpcClient`] delegates to a remote service speaking the
//! schema in [`schema`].

pub mod schema;

pub use schema::{DecodedRequest, MatchOptions, MatchRequest, MatchResponse, PageResult};

use crate::diff::{PixelComparator, YiqComparator};
use crate::raster::{PopplerRasterizer, RasterPage, RasterSource, RenderOptions};
use crate::reconcile::{MatchReport, Reconciler};
use crate::utils::error::MatchError;
use log::info;
use std::time::Instant;

/// Produces a match report for a document and its stored snapshots.
pub trait MatchEngine: Send + Sync {
    fn match_document(
        &self,
        pdf: &[u8],
        snapshots: &[RasterPage],
        options: &MatchOptions,
    ) -> Result<MatchReport, MatchError>;
}

impl<T: MatchEngine + ?Sized> MatchEngine for Box<T> {
    fn match_document(
        &self,
        pdf: &[u8],
        snapshots: &[RasterPage],
        options: &MatchOptions,
    ) -> Result<MatchReport, MatchError> {
        (**self).match_document(pdf, snapshots, options)
    }
}

/// Renders and reconciles in the current process
#[derive(Debug, Clone, Default)]
pub struct LocalEngine<R = PopplerRasterizer, C = YiqComparator> {
    source: R,
    reconciler: Reconciler<C>,
}

impl<R: RasterSource> LocalEngine<R, YiqComparator> {
    /// Engine with the default perceptual comparator
    pub fn new(source: R) -> Self {
        Self::with_reconciler(source, Reconciler::default())
    }
}

impl<R: RasterSource, C: PixelComparator> LocalEngine<R, C> {
    pub fn with_reconciler(source: R, reconciler: Reconciler<C>) -> Self {
        Self { source, reconciler }
    }

    pub fn source(&self) -> &R {
        &self.source
    }
}

impl<R: RasterSource, C: PixelComparator> MatchEngine for LocalEngine<R, C> {
    fn match_document(
        &self,
        pdf: &[u8],
        snapshots: &[RasterPage],
        options: &MatchOptions,
    ) -> Result<MatchReport, MatchError> {
        let start = Instant::now();

        let pages = self
            .source
            .render(pdf, &RenderOptions::with_scale(options.scale()))?;
        let report = self
            .reconciler
            .reconcile(&pages, snapshots, options.failure_threshold())?;

        info!(
            "Matched {} page(s) against {} snapshot(s) in {:.2}s",
            pages.len(),
            snapshots.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(report)
    }
}

/// Handle one wire request end to end.
///
/// # Errors
/// * `MatchError::InvalidUsage` - Malformed payloads or options, rejected
///   before rendering
/// * Any render, size-mismatch or encoding failure of the match itself
pub fn process<E: MatchEngine + ?Sized>(
    request: &MatchRequest,
    engine: &E,
) -> Result<MatchResponse, MatchError> {
    let decoded = request.decode()?;
    let report = engine.match_document(&decoded.pdf, &decoded.snapshots, &decoded.options)?;
    Ok(MatchResponse::from_report(&report)?)
}
