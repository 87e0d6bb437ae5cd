//! Check command implementation.
//!
//! The check command:
//! 1. Reads the PDF document
//! 2. Loads the stored snapshots of the test
//! 3. Renders and reconciles (locally or through a match service)
//! 4. Writes new snapshots, updates or review composites
//! 5. Reports the outcome

use super::models::CheckArgs;
use crate::matcher::{MatchContext, MatchResult, SnapshotMatcher};
use crate::output::{render_terminal_report, write_report, ReportFile};
use crate::raster::PopplerRasterizer;
use crate::rpc::RpcClient;
use crate::service::{LocalEngine, MatchEngine, MatchOptions};
use crate::store::FsSnapshotStore;
use crate::utils::config::{MAX_REQUEST_SCALE, MIN_REQUEST_SCALE};
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::time::Instant;

/// Execute the check command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The match result when the document matches (or snapshots were written),
/// Err with the per-page message when it does not
pub fn execute_check(args: CheckArgs) -> Result<MatchResult> {
    let start_time = Instant::now();

    info!("Checking {} as {:?}", args.pdf.display(), args.test_name);

    let pdf = fs::read(&args.pdf)
        .with_context(|| format!("Failed to read PDF {}", args.pdf.display()))?;

    let engine = build_engine(&args)?;
    let store = FsSnapshotStore::for_test_file(&args.test_path);
    info!("Snapshot directory: {}", store.dir().display());

    let matcher = SnapshotMatcher::new(engine, store);
    let context = MatchContext::new(args.test_name.clone()).with_update_mode(args.update);
    let options = MatchOptions {
        scale: args.scale,
        failure_threshold: args.threshold,
    };

    let result = matcher
        .to_match_pdf_snapshot(&pdf, &context, &options)
        .context("Failed to match PDF snapshot")?;

    if args.print_summary {
        println!("{}", render_terminal_report(&args.test_name, &result));
        println!("Snapshots: {}", matcher.counters().summary());
    }

    if let Some(report_path) = &args.report {
        write_report(&ReportFile::from_result(&args.test_name, &result), report_path)
            .context("Failed to write report JSON")?;
    }

    info!(
        "Check completed in {:.2}s ({})",
        start_time.elapsed().as_secs_f64(),
        matcher.counters().summary()
    );

    if !result.pass {
        anyhow::bail!("{}", result.message);
    }

    Ok(result)
}

/// Remote engine when a server URL is configured, local rendering otherwise
///
/// **Private** - internal helper for execute_check
fn build_engine(args: &CheckArgs) -> Result<Box<dyn MatchEngine>> {
    if let Some(url) = &args.server_url {
        info!("Using match service at {}", url);
        let client = RpcClient::new(url.as_str()).context("Failed to create RPC client")?;
        return Ok(Box::new(client));
    }

    let rasterizer = match &args.poppler_bin {
        Some(bin) => PopplerRasterizer::new(bin),
        None => PopplerRasterizer::from_env(),
    };
    Ok(Box::new(LocalEngine::new(rasterizer)))
}

/// Validate check arguments
///
/// **Public** - can be called before execute_check for early validation
pub fn validate_args(args: &CheckArgs) -> Result<()> {
    if args.pdf.as_os_str().is_empty() {
        anyhow::bail!("PDF path cannot be empty");
    }

    if args.test_name.trim().is_empty() {
        anyhow::bail!("Test name cannot be empty");
    }

    if let Some(url) = &args.server_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Server URL must start with http:// or https://");
        }
    }

    if let Some(scale) = args.scale {
        if !(MIN_REQUEST_SCALE..=MAX_REQUEST_SCALE).contains(&scale) {
            anyhow::bail!(
                "Scale must be between {} and {}",
                MIN_REQUEST_SCALE,
                MAX_REQUEST_SCALE
            );
        }
    }

    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("Threshold must be between 0 and 1");
        }
    }

    Ok(())
}
