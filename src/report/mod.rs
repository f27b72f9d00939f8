//! Operator-facing output: status lines, prompts and transfer progress.
//!
//! The library only talks to the traits in this module; [`terminal`] provides
//! the interactive implementation used by the binary and [`NullReporter`]
//! discards everything.

pub mod scale;
pub mod terminal;

use std::io;
use std::time::Duration;

pub use scale::{UNITS, format_size, scale1024};
pub use terminal::TransferReporter;

/// Severity of a console status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress of the run (green).
    Info,
    /// Per-file activity (cyan).
    Activity,
    /// Something the operator should look at (yellow).
    Warning,
    /// A failure (red).
    Error,
}

/// Console collaborator: status lines and line prompts.
pub trait Console: Send + Sync {
    /// Prints a status line, optionally replacing the previous one.
    fn report(&self, message: &str, severity: Severity, rewrite_last_line: bool);

    /// Prints `message` and reads one line of input.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, or `UnexpectedEof` when input is closed.
    fn prompt(&self, message: &str) -> io::Result<String>;
}

/// Receives byte-level progress for the file currently being transferred.
pub trait ProgressSink: Send + Sync {
    /// A transfer of `total` bytes starts, `position` bytes already on disk.
    fn begin(&self, total: u64, position: u64);

    /// `bytes` more were written.
    fn advance(&self, bytes: u64);

    /// The transfer ended (successfully or not).
    fn end(&self);
}

/// Reporter that drops all output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Console for NullReporter {
    fn report(&self, _message: &str, _severity: Severity, _rewrite_last_line: bool) {}

    fn prompt(&self, _message: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no interactive input available",
        ))
    }
}

impl ProgressSink for NullReporter {
    fn begin(&self, _total: u64, _position: u64) {}
    fn advance(&self, _bytes: u64) {}
    fn end(&self) {}
}

/// Per-file status shown in front of the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferVerb {
    Downloading,
    Resuming,
    Downloaded,
    AlreadyDownloaded,
    Failed,
}

impl TransferVerb {
    /// Fixed-width label so file names line up.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Downloading => "Downloading",
            Self::Resuming => "Resuming   ",
            Self::Downloaded => "Downloaded ",
            Self::AlreadyDownloaded => "Already DLd",
            Self::Failed => "Failed     ",
        }
    }
}

/// Formats `"<verb> <index>/<total>: <name>"`, the index zero-padded to the
/// width of `total`.
#[must_use]
pub fn file_line(verb: TransferVerb, index: usize, total: usize, name: &str) -> String {
    let width = total.to_string().len();
    format!("{} {index:0width$}/{total}: {name}", verb.label())
}

/// Completion percentage, clamped to 100. A zero total counts as complete.
#[must_use]
pub fn percent(current: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (current as f64 / total as f64 * 100.0).min(100.0)
}

/// Plain-text progress summary: percentage, sizes and average rate.
#[must_use]
pub fn render_status(current: u64, total: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        (current as f64 / secs) as u64
    } else {
        0
    };
    format!(
        "{:5.1}% | {} / {} | {}/s",
        percent(current, total),
        format_size(current),
        format_size(total),
        format_size(rate)
    )
}
