//! End-of-run output: the closing status line and the `--json` summary.

use anyhow::{Context, Result};
use datfetch_core::{Console, RunSummary, Severity};

/// One-line recap of what happened to the matched files.
pub(crate) fn completion_line(summary: &RunSummary) -> String {
    if summary.list_only {
        return format!(
            "Listed {} wanted, {} found, {} missing",
            summary.wanted,
            summary.found,
            summary.missing.len()
        );
    }

    let mut line = format!(
        "Finished: {} downloaded, {} resumed, {} already complete, {} failed",
        summary.downloaded,
        summary.resumed,
        summary.already_complete,
        summary.failed.len()
    );
    let skipped = summary.not_attempted();
    if skipped > 0 {
        line.push_str(&format!(", {skipped} not attempted"));
    }
    line
}

pub(crate) fn report_completion(console: &dyn Console, summary: &RunSummary) {
    let severity = if summary.interrupted || !summary.failed.is_empty() {
        Severity::Warning
    } else {
        Severity::Info
    };
    console.report(&completion_line(summary), severity, false);

    for failed in &summary.failed {
        console.report(&format!("  {}: {}", failed.file, failed.error), Severity::Error, false);
    }
}

pub(crate) fn print_summary_json(summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
    println!("{json}");
    Ok(())
}
