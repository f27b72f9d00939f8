//! Final run report.

use serde::Serialize;

use crate::catalog::MatchResult;
use crate::download::{DownloadOutcome, OutcomeKind};

/// A file abandoned after retries, with the error shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

/// Counts and lists describing one run; serialized for `--json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub system: String,
    pub catalog: Option<String>,
    pub collection: Option<String>,
    pub wanted: usize,
    pub found: usize,
    pub missing: Vec<String>,
    pub downloaded: usize,
    pub resumed: usize,
    pub already_complete: usize,
    pub failed: Vec<FailedFile>,
    pub interrupted: bool,
    pub list_only: bool,
}

impl RunSummary {
    /// Starts a summary from the reconciliation result.
    #[must_use]
    pub fn from_match(matched: &MatchResult) -> Self {
        Self {
            wanted: matched.wanted(),
            found: matched.matched.len(),
            missing: matched.missing.clone(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome.kind {
            OutcomeKind::Downloaded => self.downloaded += 1,
            OutcomeKind::Resumed => self.resumed += 1,
            OutcomeKind::AlreadyComplete => self.already_complete += 1,
        }
    }

    pub fn record_failure(&mut self, file: impl Into<String>, error: impl ToString) {
        self.failed.push(FailedFile {
            file: file.into(),
            error: error.to_string(),
        });
    }

    /// Files that are complete on disk after this run.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.downloaded + self.resumed + self.already_complete
    }

    /// Matched files neither completed nor failed (skipped by an interrupt).
    #[must_use]
    pub fn not_attempted(&self) -> usize {
        if self.list_only {
            return 0;
        }
        self.found
            .saturating_sub(self.completed())
            .saturating_sub(self.failed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RemoteEntry;
    use std::time::Duration;

    fn outcome(kind: OutcomeKind) -> DownloadOutcome {
        DownloadOutcome {
            kind,
            bytes_on_disk: 1,
            attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_from_match_counts() {
        let matched = MatchResult {
            matched: vec![RemoteEntry::new("Foo.zip", "http://h/Foo.zip")],
            missing: vec!["Bar".to_string()],
        };
        let summary = RunSummary::from_match(&matched);
        assert_eq!(summary.wanted, 2);
        assert_eq!(summary.found, 1);
        assert_eq!(summary.missing, vec!["Bar"]);
    }

    #[test]
    fn test_record_and_not_attempted() {
        let mut summary = RunSummary {
            found: 5,
            ..RunSummary::default()
        };
        summary.record(&outcome(OutcomeKind::Downloaded));
        summary.record(&outcome(OutcomeKind::Resumed));
        summary.record(&outcome(OutcomeKind::AlreadyComplete));
        summary.record_failure("X.zip", "boom");

        assert_eq!(summary.completed(), 3);
        assert_eq!(summary.not_attempted(), 1);
        assert_eq!(summary.failed[0].error, "boom");
    }

    #[test]
    fn test_serializes_to_json() {
        let summary = RunSummary {
            system: "Nintendo - Game Boy".to_string(),
            interrupted: true,
            ..RunSummary::default()
        };
        let json = serde_json::to_value(&summary).unwrap_or_default();
        assert_eq!(json["system"], "Nintendo - Game Boy");
        assert_eq!(json["interrupted"], true);
        assert!(json["failed"].as_array().is_some_and(Vec::is_empty));
    }
}
