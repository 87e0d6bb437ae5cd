//! PDF Snapshot CLI
//!
//! Visual regression checks for PDF documents.
//! Renders each page and compares it against stored page snapshots.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use std::path::{Path, PathBuf};

use pdf_snapshot::commands::{
    display_version, execute_check, execute_compare, execute_match, validate_args, CheckArgs,
    CompareArgs, MatchArgs,
};
use pdf_snapshot::utils::config::{
    load_config, FileConfig, DEFAULT_CONFIG_FILE, DEFAULT_FAILURE_THRESHOLD,
};

/// PDF Snapshot - page-by-page visual regression for PDFs
#[derive(Parser, Debug)]
#[command(name = "pdf-snapshot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a PDF against the stored snapshots of a test
    Check {
        /// PDF document to check
        #[arg(long)]
        pdf: PathBuf,

        /// Test file; snapshots are stored in __pdf_snapshots__ beside it
        #[arg(long)]
        test_path: PathBuf,

        /// Test name the snapshots are keyed by
        #[arg(long)]
        name: String,

        /// Accept differences and rewrite snapshots
        #[arg(short, long)]
        update: bool,

        /// Rendering scale (1.0 = 72 dpi)
        #[arg(long)]
        scale: Option<f64>,

        /// Fraction of differing pixels a page may have and still match
        #[arg(long)]
        threshold: Option<f64>,

        /// Remote match service URL (renders locally when unset)
        #[arg(long, env = "PDF_SNAPSHOT_SERVER_URL")]
        server: Option<String>,

        /// Configuration file (defaults to pdf-snapshot.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print a page summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Answer a JSON match request with the local renderer
    Match {
        /// Path to the request JSON
        #[arg(short, long)]
        request: PathBuf,

        /// Output path for the response JSON (stdout when unset)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two page images
    Compare {
        /// Reference PNG
        #[arg(long)]
        reference: PathBuf,

        /// Received PNG
        #[arg(long)]
        received: PathBuf,

        /// Fraction of differing pixels allowed
        #[arg(long, default_value_t = DEFAULT_FAILURE_THRESHOLD)]
        threshold: f64,

        /// Output path for the side-by-side diff image
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Check {
            pdf,
            test_path,
            name,
            update,
            scale,
            threshold,
            server,
            config,
            report,
            summary,
        } => {
            let mut args = CheckArgs {
                pdf,
                test_path,
                test_name: name,
                update,
                scale,
                threshold,
                server_url: server,
                poppler_bin: None,
                report,
                print_summary: summary,
            };

            let file_config = resolve_config(config.as_deref())?;
            args.apply_config(&file_config);

            // Validate args first
            validate_args(&args)?;

            execute_check(args)?;
        }

        Commands::Match { request, output } => {
            let file_config = resolve_config(None)?;
            execute_match(MatchArgs {
                request,
                output,
                poppler_bin: file_config.poppler_bin,
            })?;
        }

        Commands::Compare {
            reference,
            received,
            threshold,
            output,
        } => {
            execute_compare(CompareArgs {
                reference,
                received,
                threshold,
                output,
            })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Load the explicit config file, or the default one when it exists
///
/// **Private** - internal helper
fn resolve_config(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                debug!("Loading {}", DEFAULT_CONFIG_FILE);
                load_config(default_path).context("Failed to load default config")
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}
