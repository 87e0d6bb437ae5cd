//! Per-page outcomes and the ordered report built from them.

use crate::diff::PageDiff;
use crate::raster::RasterPage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one page position
#[derive(Debug, Clone, PartialEq)]
pub enum DiffOutcome {
    /// Both sides exist and the ratio is within the threshold
    Matched { diff_ratio: f64 },

    /// Both sides exist and the ratio exceeds the threshold
    Changed {
        diff_ratio: f64,
        new_page: RasterPage,
        diff_visualization: RasterPage,
    },

    /// Rendered page without a stored snapshot
    Added { new_page: RasterPage },

    /// Stored snapshot without a rendered page
    Deleted,
}

impl DiffOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            DiffOutcome::Matched { .. } => OutcomeKind::Matched,
            DiffOutcome::Changed { .. } => OutcomeKind::Changed,
            DiffOutcome::Added { .. } => OutcomeKind::Added,
            DiffOutcome::Deleted => OutcomeKind::Deleted,
        }
    }

    pub fn diff_ratio(&self) -> Option<f64> {
        match self {
            DiffOutcome::Matched { diff_ratio } | DiffOutcome::Changed { diff_ratio, .. } => {
                Some(*diff_ratio)
            }
            DiffOutcome::Added { .. } | DiffOutcome::Deleted => None,
        }
    }

    /// Page that would become the new snapshot, if any
    pub fn new_page(&self) -> Option<&RasterPage> {
        match self {
            DiffOutcome::Changed { new_page, .. } | DiffOutcome::Added { new_page } => {
                Some(new_page)
            }
            DiffOutcome::Matched { .. } | DiffOutcome::Deleted => None,
        }
    }

    pub fn diff_visualization(&self) -> Option<&RasterPage> {
        match self {
            DiffOutcome::Changed {
                diff_visualization, ..
            } => Some(diff_visualization),
            DiffOutcome::Matched { .. } | DiffOutcome::Added { .. } | DiffOutcome::Deleted => None,
        }
    }
}

impl From<PageDiff> for DiffOutcome {
    fn from(diff: PageDiff) -> Self {
        match diff {
            PageDiff::Matched { diff_ratio } => DiffOutcome::Matched { diff_ratio },
            PageDiff::Changed {
                diff_ratio,
                new_page,
                diff_visualization,
            } => DiffOutcome::Changed {
                diff_ratio,
                new_page,
                diff_visualization,
            },
        }
    }
}

/// Payload-free tag of a [`DiffOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Matched,
    Changed,
    Added,
    Deleted,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeKind::Matched => "Pass",
            OutcomeKind::Changed => "Does not match snapshot",
            OutcomeKind::Added => "Added",
            OutcomeKind::Deleted => "Deleted",
        };
        f.write_str(label)
    }
}

/// Aggregate classification of a whole report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Every page matched (also the empty report)
    Matched,
    /// Every page is new: first run without snapshots
    Added,
    /// Anything else
    Mismatch,
}

/// Pending change to the snapshot store for one ordinal
#[derive(Debug, Clone, PartialEq)]
pub enum StoreMutation {
    Write { ordinal: usize, page: RasterPage },
    Delete { ordinal: usize },
}

/// Counts per classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub matched: usize,
    pub changed: usize,
    pub added: usize,
    pub deleted: usize,
}

impl ReportSummary {
    pub fn total(&self) -> usize {
        self.matched + self.changed + self.added + self.deleted
    }

    pub fn summary(&self) -> String {
        format!(
            "{} page(s): {} matched, {} changed, {} added, {} deleted",
            self.total(),
            self.matched,
            self.changed,
            self.added,
            self.deleted
        )
    }
}

/// Ordered outcomes, one per 1-based ordinal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    outcomes: Vec<DiffOutcome>,
}

impl MatchReport {
    pub fn new(outcomes: Vec<DiffOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[DiffOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<DiffOutcome> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome at a 1-based ordinal
    pub fn get(&self, ordinal: usize) -> Option<&DiffOutcome> {
        ordinal.checked_sub(1).and_then(|i| self.outcomes.get(i))
    }

    /// `(ordinal, outcome)` pairs, ordinals starting at 1
    pub fn iter(&self) -> impl Iterator<Item = (usize, &DiffOutcome)> {
        self.outcomes.iter().enumerate().map(|(i, o)| (i + 1, o))
    }

    pub fn is_all_matched(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, DiffOutcome::Matched { .. }))
    }

    pub fn is_all_added(&self) -> bool {
        !self.outcomes.is_empty()
            && self
                .outcomes
                .iter()
                .all(|o| matches!(o, DiffOutcome::Added { .. }))
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_all_matched() {
            Verdict::Matched
        } else if self.is_all_added() {
            Verdict::Added
        } else {
            Verdict::Mismatch
        }
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for outcome in &self.outcomes {
            match outcome.kind() {
                OutcomeKind::Matched => summary.matched += 1,
                OutcomeKind::Changed => summary.changed += 1,
                OutcomeKind::Added => summary.added += 1,
                OutcomeKind::Deleted => summary.deleted += 1,
            }
        }
        summary
    }

    /// Store changes that accept this report as the new baseline.
    ///
    /// Matched pages need nothing; changed and added pages are written;
    /// deleted pages are removed.
    pub fn accept_mutations(&self) -> Vec<StoreMutation> {
        self.iter()
            .filter_map(|(ordinal, outcome)| match outcome {
                DiffOutcome::Matched { .. } => None,
                DiffOutcome::Changed { new_page, .. } | DiffOutcome::Added { new_page } => {
                    Some(StoreMutation::Write {
                        ordinal,
                        page: new_page.clone(),
                    })
                }
                DiffOutcome::Deleted => Some(StoreMutation::Delete { ordinal }),
            })
            .collect()
    }

    /// Human-readable lines, one per ordinal
    pub fn page_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(ordinal, outcome)| match outcome.diff_ratio() {
                Some(ratio) => format!(
                    "[Page {}] - {} - diffRatio {}",
                    ordinal,
                    outcome.kind(),
                    ratio
                ),
                None => format!("[Page {}] - {}", ordinal, outcome.kind()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> RasterPage {
        RasterPage::filled(1, 1, [0, 0, 0, 255])
    }

    #[test]
    fn test_empty_report_is_all_matched_not_added() {
        let report = MatchReport::default();
        assert!(report.is_all_matched());
        assert!(!report.is_all_added());
        assert_eq!(report.verdict(), Verdict::Matched);
    }

    #[test]
    fn test_verdicts() {
        let added = MatchReport::new(vec![DiffOutcome::Added { new_page: page() }]);
        assert_eq!(added.verdict(), Verdict::Added);

        let mixed = MatchReport::new(vec![
            DiffOutcome::Matched { diff_ratio: 0.0 },
            DiffOutcome::Added { new_page: page() },
        ]);
        assert_eq!(mixed.verdict(), Verdict::Mismatch);

        let deleted = MatchReport::new(vec![DiffOutcome::Deleted]);
        assert_eq!(deleted.verdict(), Verdict::Mismatch);
    }

    #[test]
    fn test_accept_mutations_skip_matched() {
        let report = MatchReport::new(vec![
            DiffOutcome::Matched { diff_ratio: 0.0 },
            DiffOutcome::Added { new_page: page() },
            DiffOutcome::Deleted,
        ]);

        let mutations = report.accept_mutations();
        assert_eq!(
            mutations,
            vec![
                StoreMutation::Write {
                    ordinal: 2,
                    page: page()
                },
                StoreMutation::Delete { ordinal: 3 },
            ]
        );
    }

    #[test]
    fn test_page_lines() {
        let report = MatchReport::new(vec![
            DiffOutcome::Matched { diff_ratio: 0.0 },
            DiffOutcome::Changed {
                diff_ratio: 0.25,
                new_page: page(),
                diff_visualization: page(),
            },
            DiffOutcome::Added { new_page: page() },
            DiffOutcome::Deleted,
        ]);

        assert_eq!(
            report.page_lines(),
            vec![
                "[Page 1] - Pass - diffRatio 0",
                "[Page 2] - Does not match snapshot - diffRatio 0.25",
                "[Page 3] - Added",
                "[Page 4] - Deleted",
            ]
        );
    }

    #[test]
    fn test_summary_counts() {
        let report = MatchReport::new(vec![
            DiffOutcome::Matched { diff_ratio: 0.0 },
            DiffOutcome::Deleted,
            DiffOutcome::Deleted,
        ]);
        let summary = report.summary();
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.deleted, 2);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_get_is_one_based() {
        let report = MatchReport::new(vec![DiffOutcome::Deleted]);
        assert!(report.get(0).is_none());
        assert_eq!(report.get(1), Some(&DiffOutcome::Deleted));
        assert!(report.get(2).is_none());
    }
}
