//! Compare command implementation.
//! Diffs two page images directly, without rendering or a snapshot store.

use super::models::CompareArgs;
use crate::diff::{PageDiff, PageDiffer, YiqComparator};
use crate::output::write_png;
use crate::raster::RasterPage;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

/// Execute the compare command
///
/// # Returns
/// The page diff when the pages match, Err when they differ or cannot be compared
pub fn execute_compare(args: CompareArgs) -> Result<PageDiff> {
    // Step 1: Load both pages
    let reference = load_page(&args.reference).context("Failed to read reference image")?;
    let received = load_page(&args.received).context("Failed to read received image")?;

    // Step 2: Diff
    let differ = PageDiffer::new(YiqComparator::default());
    let page_diff = differ
        .diff(&received, &reference, args.threshold)
        .context("Failed to compare pages")?;

    match &page_diff {
        PageDiff::Matched { diff_ratio } => {
            println!("✅ Pages match (diffRatio {})", diff_ratio);
            Ok(page_diff)
        }
        PageDiff::Changed {
            diff_ratio,
            diff_visualization,
            ..
        } => {
            // Step 3: Write the composite if requested
            if let Some(path) = &args.output {
                write_png(diff_visualization, path).context("Failed to write diff image")?;
                println!(
                    "🖼  Diff image written to {}",
                    path.display().to_string().cyan()
                );
            }
            Err(anyhow::anyhow!(
                "Pages differ (diffRatio {} > threshold {})",
                diff_ratio,
                args.threshold
            ))
        }
    }
}

fn load_page(path: &Path) -> Result<RasterPage> {
    let bytes = fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    Ok(RasterPage::from_png(&bytes)?)
}
