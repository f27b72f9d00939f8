//! datfetch core library
//!
//! Downloads the files a DAT manifest lists from an HTTP file archive. Files
//! are matched by normalized name, fetched one at a time, and resumed from
//! whatever is already on disk.
//!
//! # Architecture
//!
//! - [`manifest`] - DAT parsing into a system label, catalog and wanted names
//! - [`catalog`] - name normalization, remote entries and the matcher
//! - [`archive`] - directory listing browsing and catalog/collection selection
//! - [`download`] - resumable, retrying HTTP downloads
//! - [`report`] - console, progress and size formatting
//! - [`run`] - run context, coordinator and final summary

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod catalog;
pub mod download;
pub mod manifest;
mod markup;
pub mod report;
pub mod run;
mod user_agent;

// Re-export commonly used types
pub use archive::{ArchiveBrowser, BrowseError, ListingEntry};
pub use catalog::{MatchResult, RemoteEntry, RemoteIndex, WantedList, match_entries};
pub use download::{
    DownloadError, DownloadOutcome, HttpClient, OutcomeKind, ResumableDownloader, RetryPolicy,
};
pub use manifest::{Manifest, ManifestError, load_manifest};
pub use report::{Console, ProgressSink, Severity, TransferReporter};
pub use run::{RunContext, RunCoordinator, RunSummary};
