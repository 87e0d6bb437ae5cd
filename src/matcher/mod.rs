//! Snapshot matcher: the surface a test harness calls.
//!
//! Given a document and the current test's identity, the matcher loads the
//! stored snapshots, asks its engine for a report and decides what to do:
//!
//! 1. every page matched: pass
//! 2. every page is new (first run): store them all, pass
//! 3. update mode: accept the report as the new baseline, pass
//! 4. otherwise: store review composites, fail with a per-page message
//!
//! Both the engine and the store are injected; nothing is read from ambient
//! state at call time.

use crate::reconcile::{DiffOutcome, MatchReport, Verdict};
use crate::service::{MatchEngine, MatchOptions};
use crate::store::{apply_mutations, SnapshotKey, SnapshotStore};
use crate::utils::error::MatchError;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Identity and mode of the calling test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    /// Fully-qualified test name; namespaces its snapshots
    pub test_name: String,

    /// The harness asked for the negated matcher
    pub negated: bool,

    /// Accept differences as the new baseline instead of failing
    pub update_mode: bool,
}

impl MatchContext {
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            ..Default::default()
        }
    }

    pub fn with_update_mode(mut self, update_mode: bool) -> Self {
        self.update_mode = update_mode;
        self
    }

    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }
}

/// Which snapshot-state counter a match bumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotCounter {
    Matched,
    Added,
    Updated,
    Unmatched,
}

impl fmt::Display for SnapshotCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SnapshotCounter::Matched => "matched",
            SnapshotCounter::Added => "added",
            SnapshotCounter::Updated => "updated",
            SnapshotCounter::Unmatched => "unmatched",
        };
        f.write_str(label)
    }
}

/// Running totals across matcher calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCounters {
    pub matched: usize,
    pub added: usize,
    pub updated: usize,
    pub unmatched: usize,
}

impl SnapshotCounters {
    pub fn total(&self) -> usize {
        self.matched + self.added + self.updated + self.unmatched
    }

    pub fn summary(&self) -> String {
        format!(
            "{} matched, {} added, {} updated, {} unmatched",
            self.matched, self.added, self.updated, self.unmatched
        )
    }

    pub fn record(&mut self, counter: SnapshotCounter) {
        match counter {
            SnapshotCounter::Matched => self.matched += 1,
            SnapshotCounter::Added => self.added += 1,
            SnapshotCounter::Updated => self.updated += 1,
            SnapshotCounter::Unmatched => self.unmatched += 1,
        }
    }
}

/// What the harness gets back
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub pass: bool,

    /// Empty on success, per-page breakdown on failure
    pub message: String,

    pub counter: SnapshotCounter,

    pub report: MatchReport,
}

pub struct SnapshotMatcher<E, S> {
    engine: E,
    store: S,
    counters: Mutex<SnapshotCounters>,
}

impl<E: MatchEngine, S: SnapshotStore> SnapshotMatcher<E, S> {
    pub fn new(engine: E, store: S) -> Self {
        Self {
            engine,
            store,
            counters: Mutex::new(SnapshotCounters::default()),
        }
    }

    /// Counters accumulated by every completed match of this matcher
    pub fn counters(&self) -> SnapshotCounters {
        match self.counters.lock() {
            Ok(counters) => *counters,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Match `pdf` against the snapshots of `context.test_name`.
    ///
    /// # Errors
    /// * `MatchError::InvalidUsage` - Negated matcher, empty document, bad
    ///   options or unusable test name; raised before any work
    /// * Any render, size-mismatch, store or transport failure
    pub fn to_match_pdf_snapshot(
        &self,
        pdf: &[u8],
        context: &MatchContext,
        options: &MatchOptions,
    ) -> Result<MatchResult, MatchError> {
        validate_usage(pdf, context, options)?;
        let test_name = context.test_name.as_str();

        self.store.clear_diffs(test_name)?;
        let snapshots = self.store.list(test_name)?;
        debug!("Loaded {} snapshot(s) for {:?}", snapshots.len(), test_name);

        let report = self.engine.match_document(pdf, &snapshots, options)?;

        let verdict = report.verdict();
        let counter = match verdict {
            Verdict::Matched => SnapshotCounter::Matched,
            Verdict::Added => {
                apply_mutations(&self.store, test_name, &report.accept_mutations())?;
                info!("Wrote {} new snapshot(s) for {:?}", report.len(), test_name);
                SnapshotCounter::Added
            }
            Verdict::Mismatch if context.update_mode => {
                let mutations = report.accept_mutations();
                apply_mutations(&self.store, test_name, &mutations)?;
                info!(
                    "Updated {} snapshot(s) for {:?}",
                    mutations.len(),
                    test_name
                );
                SnapshotCounter::Updated
            }
            Verdict::Mismatch => {
                self.write_review_composites(test_name, &report)?;
                warn!("Snapshot mismatch for {:?}: {}", test_name, report.summary().summary());
                SnapshotCounter::Unmatched
            }
        };

        match self.counters.lock() {
            Ok(mut counters) => counters.record(counter),
            Err(poisoned) => poisoned.into_inner().record(counter),
        }

        let pass = counter != SnapshotCounter::Unmatched;
        let message = if pass {
            String::new()
        } else {
            failure_message(&report)
        };

        Ok(MatchResult {
            pass,
            message,
            counter,
            report,
        })
    }

    fn write_review_composites(
        &self,
        test_name: &str,
        report: &MatchReport,
    ) -> Result<(), MatchError> {
        for (ordinal, outcome) in report.iter() {
            match outcome {
                DiffOutcome::Changed {
                    diff_visualization, ..
                } => self.store.write_diff(test_name, ordinal, diff_visualization)?,
                DiffOutcome::Matched { .. } | DiffOutcome::Added { .. } | DiffOutcome::Deleted => {}
            }
        }
        Ok(())
    }
}

fn validate_usage(
    pdf: &[u8],
    context: &MatchContext,
    options: &MatchOptions,
) -> Result<(), MatchError> {
    if context.negated {
        return Err(MatchError::InvalidUsage(
            "`.not` cannot be used with `toMatchPdfSnapshot`".to_string(),
        ));
    }

    if pdf.is_empty() {
        return Err(MatchError::InvalidUsage(
            "`toMatchPdfSnapshot` expects a PDF document".to_string(),
        ));
    }

    options.validate()?;

    SnapshotKey::new(&context.test_name, 1)
        .map_err(|e| MatchError::InvalidUsage(e.to_string()))?;

    Ok(())
}

/// Multi-line failure message listing every ordinal
pub fn failure_message(report: &MatchReport) -> String {
    format!(
        "Does not match with snapshot.\n\n{}",
        report.page_lines().join("\n")
    )
}
