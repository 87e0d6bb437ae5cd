//! Match command implementation.
//! Answers one wire request with the local engine, the way a match service would.

use super::models::MatchArgs;
use crate::raster::PopplerRasterizer;
use crate::service::{process, LocalEngine, MatchEngine, MatchRequest, MatchResponse};
use anyhow::{Context, Result};
use colored::*;
use log::info;
use std::fs;

/// Execute the match command
pub fn execute_match(args: MatchArgs) -> Result<MatchResponse> {
    let rasterizer = match &args.poppler_bin {
        Some(bin) => PopplerRasterizer::new(bin),
        None => PopplerRasterizer::from_env(),
    };
    execute_match_with(&args, &LocalEngine::new(rasterizer))
}

/// Execute the match command against an arbitrary engine
pub fn execute_match_with<E: MatchEngine + ?Sized>(
    args: &MatchArgs,
    engine: &E,
) -> Result<MatchResponse> {
    // Step 1: Load request
    let raw = fs::read_to_string(&args.request)
        .with_context(|| format!("Failed to read request {}", args.request.display()))?;
    let request: MatchRequest =
        serde_json::from_str(&raw).context("Request is not a valid match request")?;

    info!(
        "Processing request with {} stored snapshot(s)",
        request.snapshots.len()
    );

    // Step 2: Match
    let response = process(&request, engine).context("Failed to match PDF")?;

    // Step 3: Emit response
    let json = serde_json::to_string_pretty(&response)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).context("Failed to write response JSON")?;
            println!(
                "📊 Match response written to {}",
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", json),
    }

    Ok(response)
}
