//! Page image comparison.
//!
//! A [`PageDiffer`] compares one rendered page against its stored snapshot
//! and, when they differ beyond the failure threshold, assembles a
//! side-by-side composite for review.
//!
//! # Example
//! ```ignore
//! use pdf_snapshot::diff::{PageDiff, PageDiffer};
//!
//! let differ = PageDiffer::default();
//! match differ.diff(&received, &reference, 0.01)? {
//!     PageDiff::Matched { diff_ratio } => println!("ok ({})", diff_ratio),
//!     PageDiff::Changed { diff_visualization, .. } => save(diff_visualization),
//! }
//! ```

pub mod comparator;
pub mod composite;
pub mod page;

// Public API exports
pub use comparator::{PixelComparator, PixelDiff, YiqComparator};
pub use composite::compose_side_by_side;
pub use page::{validate_threshold, PageDiff, PageDiffer};
