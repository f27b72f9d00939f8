//! Terminal implementation of the console and progress traits.

use std::io::{self, BufRead, Write};
use std::sync::{Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

use super::{Console, ProgressSink, Severity, format_size, render_status};

const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[00m";
const CURSOR_UP_CLEAR: &str = "\x1b[1A\x1b[2K";

const BAR_TEMPLATE: &str =
    "{percent:>3}% | {bytes} / {msg} [{bar:40.cyan/blue}] {eta} | {bytes_per_sec}";

/// Colored status lines on stdout plus one progress bar per transfer on stderr.
#[derive(Debug)]
pub struct TransferReporter {
    color: bool,
    show_progress: bool,
    lines_to_stderr: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl TransferReporter {
    /// `color` enables ANSI colors on status lines; `show_progress` draws bars.
    #[must_use]
    pub fn new(color: bool, show_progress: bool) -> Self {
        Self {
            color,
            show_progress,
            lines_to_stderr: false,
            bar: Mutex::new(None),
        }
    }

    /// Sends status lines and prompts to stderr, keeping stdout for machine output.
    #[must_use]
    pub fn with_lines_to_stderr(mut self, lines_to_stderr: bool) -> Self {
        self.lines_to_stderr = lines_to_stderr;
        self
    }

    fn paint(&self, message: &str, severity: Severity) -> String {
        if !self.color {
            return message.to_string();
        }
        let code = match severity {
            Severity::Info => GREEN,
            Severity::Activity => CYAN,
            Severity::Warning => YELLOW,
            Severity::Error => RED,
        };
        format!("{code}{message}{RESET}")
    }

    fn new_bar(&self, total: u64) -> ProgressBar {
        let bar = if self.show_progress {
            ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_length(total);
        bar.set_message(format_size(total));
        bar
    }
}

impl Console for TransferReporter {
    fn report(&self, message: &str, severity: Severity, rewrite_last_line: bool) {
        let mut line = self.paint(message, severity);
        if rewrite_last_line && self.color {
            line.insert_str(0, CURSOR_UP_CLEAR);
        }
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(bar) if !bar.is_hidden() => bar.println(line),
            _ if self.lines_to_stderr => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    fn prompt(&self, message: &str) -> io::Result<String> {
        let painted = self.paint(message, Severity::Activity);
        if self.lines_to_stderr {
            let mut stderr = io::stderr().lock();
            write!(stderr, "{painted}")?;
            stderr.flush()?;
        } else {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{painted}")?;
            stdout.flush()?;
        }

        let mut input = String::new();
        let read = off_worker(|| io::stdin().lock().read_line(&mut input))?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for a selection",
            ));
        }
        Ok(input.trim().to_string())
    }
}

/// Runs blocking `f` without stalling a multi-thread runtime's worker.
///
/// `block_in_place` panics on a current-thread runtime, so `f` runs inline
/// there and outside any runtime.
fn off_worker<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

impl ProgressSink for TransferReporter {
    fn begin(&self, total: u64, position: u64) {
        let bar = self.new_bar(total);
        bar.set_position(position.min(total));
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = guard.replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn advance(&self, bytes: u64) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.as_ref() {
            bar.inc(bytes);
        }
    }

    fn end(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.take() {
            let total = bar.length().unwrap_or(0);
            debug!(
                status = %render_status(bar.position(), total, bar.elapsed()),
                "transfer finished"
            );
            bar.finish_and_clear();
        }
    }
}
