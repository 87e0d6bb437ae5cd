//! Terminal rendering of matcher results.

use crate::matcher::{MatchResult, SnapshotCounter};
use crate::reconcile::DiffOutcome;
use colored::*;

/// Render a human-readable summary of a match for the terminal
pub fn render_terminal_report(test_name: &str, result: &MatchResult) -> String {
    let mut out = String::new();

    out.push_str("\n📄 ");
    out.push_str(&"PDF Snapshot".bold().to_string());
    out.push_str(&format!(" {}\n", test_name));
    out.push_str("---------------------------------------------------\n");

    for (ordinal, outcome) in result.report.iter() {
        let line = match outcome {
            DiffOutcome::Matched { diff_ratio } => {
                format!("  ✅ Page {}: pass (diffRatio {})", ordinal, diff_ratio).normal()
            }
            DiffOutcome::Changed { diff_ratio, .. } => format!(
                "  ❌ Page {}: does not match snapshot (diffRatio {})",
                ordinal, diff_ratio
            )
            .red(),
            DiffOutcome::Added { .. } => format!("  ➕ Page {}: added", ordinal).green(),
            DiffOutcome::Deleted => format!("  ➖ Page {}: deleted", ordinal).yellow(),
        };
        out.push_str(&line.to_string());
        out.push('\n');
    }

    out.push_str("---------------------------------------------------\n");
    let status = match result.counter {
        SnapshotCounter::Matched => "✅ STATUS: MATCHED".green().bold(),
        SnapshotCounter::Added => format!("📝 STATUS: {} SNAPSHOT(S) WRITTEN", result.report.len())
            .green()
            .bold(),
        SnapshotCounter::Updated => "🔄 STATUS: SNAPSHOTS UPDATED".cyan().bold(),
        SnapshotCounter::Unmatched => "❌ STATUS: DOES NOT MATCH SNAPSHOT".red().bold(),
    };
    out.push_str(&status.to_string());
    out.push('\n');

    out
}
