//! PDF Snapshot
//!
//! Visual regression checks for PDF documents. Each page of a document is
//! rasterized, compared against a stored per-page PNG snapshot and
//! classified as matched, changed, added or deleted.
//!
//! This crate provides the core implementation for the
//! `pdf-snapshot` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! cargo install pdf-snapshot
//! pdf-snapshot check --pdf invoice.pdf --test-path tests/invoice.rs --name "renders invoice"
//! ```
//!
//! Pages are rendered with poppler's `pdftoppm` unless a remote match
//! service is configured with `--server` or `PDF_SNAPSHOT_SERVER_URL`.

pub mod commands;
pub mod diff;
pub mod matcher;
pub mod output;
pub mod raster;
pub mod reconcile;
pub mod rpc;
pub mod service;
pub mod store;
pub mod utils;

pub use matcher::{MatchContext, MatchResult, SnapshotMatcher};
pub use reconcile::{DiffOutcome, MatchReport};
