//! Sequencing of a whole run: reconcile the manifest with a collection, then
//! download the matches one at a time in manifest order.

mod context;
mod summary;

pub use context::RunContext;
pub use summary::{FailedFile, RunSummary};

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::catalog::{MatchResult, RemoteIndex, WantedList, match_entries};
use crate::download::ResumableDownloader;
use crate::report::{Console, Severity};

/// Drives reconciliation and the sequential download loop.
pub struct RunCoordinator {
    downloader: ResumableDownloader,
    console: Arc<dyn Console>,
}

impl std::fmt::Debug for RunCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunCoordinator")
            .field("downloader", &self.downloader)
            .finish_non_exhaustive()
    }
}

impl RunCoordinator {
    pub fn new(downloader: ResumableDownloader, console: Arc<dyn Console>) -> Self {
        Self {
            downloader,
            console,
        }
    }

    /// Matches wanted names against a collection index and reports the counts.
    pub fn reconcile(&self, wanted: &WantedList, available: &RemoteIndex) -> MatchResult {
        let result = match_entries(wanted, available);

        self.console.report(
            &format!("Amount of wanted files in DAT    : {}", result.wanted()),
            Severity::Info,
            false,
        );
        self.console.report(
            &format!("Amount of found files at server  : {}", result.matched.len()),
            Severity::Info,
            false,
        );
        if !result.missing.is_empty() {
            self.console.report(
                &format!("Amount of missing files at server: {}", result.missing.len()),
                Severity::Warning,
                false,
            );
        }
        result
    }

    /// Downloads every matched entry in order, continuing past per-file failures.
    ///
    /// Stops early only when the context is cancelled or a transfer reports an
    /// interrupt; the summary's `interrupted` flag is set in that case.
    #[instrument(skip_all, fields(dest = %ctx.dest_dir().display(), files = matched.matched.len()))]
    pub async fn execute(&self, ctx: &RunContext, matched: &MatchResult) -> RunSummary {
        let mut summary = RunSummary::from_match(matched);
        summary.list_only = ctx.list_only();

        if !ctx.list_only() {
            let total = matched.matched.len();
            for (position, entry) in matched.matched.iter().enumerate() {
                if ctx.is_cancelled() {
                    summary.interrupted = true;
                    break;
                }

                match self
                    .downloader
                    .download(ctx.dest_dir(), entry, position + 1, total, ctx.cancel_token())
                    .await
                {
                    Ok(outcome) => summary.record(&outcome),
                    Err(error) if error.is_interrupted() => {
                        warn!(file = %entry.file, "run interrupted");
                        summary.interrupted = true;
                        break;
                    }
                    Err(error) => {
                        self.console.report(
                            &format!("Failed to download {}: {error}", entry.file),
                            Severity::Error,
                            false,
                        );
                        summary.record_failure(&entry.file, &error);
                    }
                }
            }

            if summary.interrupted {
                self.console.report(
                    "Interrupted, partial files are kept and will be resumed next run",
                    Severity::Warning,
                    false,
                );
            } else {
                self.console.report("Downloading complete!", Severity::Info, false);
            }
        }

        self.report_missing(&summary);
        info!(
            completed = summary.completed(),
            failed = summary.failed.len(),
            missing = summary.missing.len(),
            interrupted = summary.interrupted,
            "run finished"
        );
        summary
    }

    fn report_missing(&self, summary: &RunSummary) {
        if summary.missing.is_empty() {
            self.console
                .report("All files in DAT found from server!", Severity::Info, false);
            return;
        }

        self.console.report(
            &format!(
                "Following {} files in DAT not automatically found from server, grab these manually:",
                summary.missing.len()
            ),
            Severity::Error,
            false,
        );
        for name in &summary.missing {
            self.console.report(name, Severity::Warning, false);
        }
    }
}
