//! Snapshot reconciliation.
//!
//! Pairs each rendered page with the stored snapshot at the same ordinal and
//! reports, per ordinal, whether the page matched, changed, was added or was
//! deleted.

mod engine;
mod outcome;

pub use engine::Reconciler;
pub use outcome::{
    DiffOutcome, MatchReport, OutcomeKind, ReportSummary, StoreMutation, Verdict,
};
