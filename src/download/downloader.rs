//! Resumable, retrying single-file downloader.
//!
//! Every attempt re-reads the remote and local sizes, so a
//! partially advanced file from a failed attempt is resumed rather than
//! restarted. Attempts run strictly one after another.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::client::{HttpClient, content_length, content_range_start};
use super::constants::CHUNK_SIZE;
use super::error::DownloadError;
use super::resume::{TransferPlan, TransferState, local_size, plan_transfer};
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use crate::catalog::RemoteEntry;
use crate::report::{Console, NullReporter, ProgressSink, Severity, TransferVerb, file_line};

/// How a successful download ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Local size already matched the remote size; nothing was transferred.
    AlreadyComplete,
    /// The whole body was streamed from byte 0.
    Downloaded,
    /// The body was appended to an existing partial file.
    Resumed,
}

/// Result of a successful [`ResumableDownloader::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub kind: OutcomeKind,
    /// Final size of the local file, equal to the remote size.
    pub bytes_on_disk: u64,
    /// Attempts used, 1-based.
    pub attempts: u32,
    /// Total backoff slept between attempts (jitter included).
    pub backoff: Duration,
}

/// Downloads [`RemoteEntry`] files into a directory with resume and retry.
pub struct ResumableDownloader {
    client: HttpClient,
    policy: RetryPolicy,
    console: Arc<dyn Console>,
    progress: Arc<dyn ProgressSink>,
}

impl std::fmt::Debug for ResumableDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumableDownloader")
            .field("client", &self.client)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ResumableDownloader {
    /// Creates a downloader that reports nothing.
    #[must_use]
    pub fn new(client: HttpClient, policy: RetryPolicy) -> Self {
        let silent = Arc::new(NullReporter);
        Self {
            client,
            policy,
            console: silent.clone(),
            progress: silent,
        }
    }

    /// Routes status lines and byte progress to `reporter`.
    #[must_use]
    pub fn with_reporter<R>(mut self, reporter: Arc<R>) -> Self
    where
        R: Console + ProgressSink + 'static,
    {
        self.console = reporter.clone();
        self.progress = reporter;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Downloads `entry` into `dest_dir`, `index` of `total` (1-based, display only).
    ///
    /// `cancel` is checked before every attempt, during backoff and before
    /// every written slice.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Interrupted`] when `cancel` fires; the partial file
    ///   is kept.
    /// - [`DownloadError::Failed`] wrapping the last error once retries are
    ///   exhausted or a permanent error occurs.
    #[instrument(skip(self, entry, cancel), fields(file = %entry.file, index, total))]
    pub async fn download(
        &self,
        dest_dir: &Path,
        entry: &RemoteEntry,
        index: usize,
        total: usize,
        cancel: &CancellationToken,
    ) -> Result<DownloadOutcome, DownloadError> {
        let path = target_path(dest_dir, &entry.file)
            .map_err(|e| DownloadError::failed(&entry.file, 0, e))?;

        let mut attempt: u32 = 0;
        let mut backoff = Duration::ZERO;

        loop {
            attempt += 1;
            if cancel.is_cancelled() {
                return Err(DownloadError::interrupted(&entry.file));
            }

            let error = match self.attempt(&path, entry, index, total, cancel).await {
                Ok((kind, bytes_on_disk)) => {
                    info!(?kind, bytes_on_disk, attempt, "download finished");
                    return Ok(DownloadOutcome {
                        kind,
                        bytes_on_disk,
                        attempts: attempt,
                        backoff,
                    });
                }
                Err(error) => error,
            };

            match self.policy.should_retry(classify_error(&error), attempt) {
                RetryDecision::Retry { delay, attempt: next } => {
                    warn!(error = %error, attempt, next, delay_ms = delay.as_millis(), "attempt failed, retrying");
                    self.console.report(
                        &format!(
                            "{}: {error}. Retrying in {:.1} s ({next}/{})",
                            entry.file,
                            delay.as_secs_f64(),
                            self.policy.max_attempts()
                        ),
                        Severity::Warning,
                        false,
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            return Err(DownloadError::interrupted(&entry.file));
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                    backoff += delay;
                }
                RetryDecision::DoNotRetry { reason } => {
                    if error.is_interrupted() {
                        return Err(error);
                    }
                    warn!(error = %error, attempt, reason = %reason, "giving up on file");
                    return Err(DownloadError::failed(&entry.file, attempt, error));
                }
            }
        }
    }

    /// One initial-plan-transfer pass. Returns the outcome kind and final size.
    async fn attempt(
        &self,
        path: &Path,
        entry: &RemoteEntry,
        index: usize,
        total: usize,
        cancel: &CancellationToken,
    ) -> Result<(OutcomeKind, u64), DownloadError> {
        let initial = self.client.get(&entry.url, None).await?;
        let remote_size = content_length(initial.headers())
            .ok_or_else(|| DownloadError::remote_size_unknown(&entry.url))?;
        let local = local_size(path).await?;
        let plan = plan_transfer(local, remote_size);
        debug!(?local, remote_size, ?plan, "transfer planned");

        let kind = match plan {
            TransferPlan::AlreadyComplete => {
                drop(initial);
                self.status(TransferVerb::AlreadyDownloaded, index, total, &entry.file, false);
                return Ok((OutcomeKind::AlreadyComplete, remote_size));
            }
            TransferPlan::Fresh => {
                self.status(TransferVerb::Downloading, index, total, &entry.file, false);
                let mut state = TransferState::new(0, remote_size, false);
                self.stream(path, initial, &mut state, &entry.file, cancel)
                    .await?;
                OutcomeKind::Downloaded
            }
            TransferPlan::Restart => {
                warn!(
                    local = local.unwrap_or(0),
                    remote_size, "local file larger than remote, restarting"
                );
                self.status(TransferVerb::Downloading, index, total, &entry.file, false);
                let mut state = TransferState::new(0, remote_size, false);
                self.stream(path, initial, &mut state, &entry.file, cancel)
                    .await?;
                OutcomeKind::Downloaded
            }
            TransferPlan::Resume { offset } => {
                drop(initial);
                let response = self.client.get(&entry.url, Some(offset)).await?;
                let served_from = content_range_start(response.headers());
                let honoured =
                    response.status() == StatusCode::PARTIAL_CONTENT && served_from == Some(offset);
                if honoured {
                    self.status(TransferVerb::Resuming, index, total, &entry.file, false);
                    let mut state = TransferState::new(offset, remote_size, true);
                    self.stream(path, response, &mut state, &entry.file, cancel)
                        .await?;
                    OutcomeKind::Resumed
                } else {
                    let response = if response.status() == StatusCode::OK {
                        warn!(offset, "range ignored by server, restarting from byte 0");
                        response
                    } else {
                        warn!(
                            offset,
                            ?served_from,
                            "range served from another offset, restarting from byte 0"
                        );
                        drop(response);
                        self.client.get(&entry.url, None).await?
                    };
                    self.status(TransferVerb::Downloading, index, total, &entry.file, false);
                    let mut state = TransferState::new(offset, remote_size, true);
                    state.restart();
                    self.stream(path, response, &mut state, &entry.file, cancel)
                        .await?;
                    OutcomeKind::Downloaded
                }
            }
        };

        let on_disk = local_size(path).await?.unwrap_or(0);
        if on_disk != remote_size {
            return Err(DownloadError::integrity(path, remote_size, on_disk));
        }

        self.status(TransferVerb::Downloaded, index, total, &entry.file, true);
        Ok((kind, on_disk))
    }

    /// Streams `response` into `path`, appending when `state.resuming`.
    ///
    /// The writer is flushed on every exit path; the file handle is closed when
    /// this returns.
    async fn stream(
        &self,
        path: &Path,
        response: Response,
        state: &mut TransferState,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> Result<(), DownloadError> {
        let file = open_target(path, state.resuming).await?;
        let mut writer = BufWriter::new(file);

        self.progress.begin(state.remote_size, state.initial_position());
        let pumped = self
            .pump(&mut writer, response, state, path, file_name, cancel)
            .await;
        let flushed = writer
            .flush()
            .await
            .map_err(|e| DownloadError::io(path, e));
        self.progress.end();

        debug!(bytes_written = state.bytes_written, position = state.position(), "stream closed");
        pumped?;
        flushed
    }

    async fn pump(
        &self,
        writer: &mut BufWriter<File>,
        response: Response,
        state: &mut TransferState,
        path: &Path,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> Result<(), DownloadError> {
        let url = response.url().to_string();
        let mut stream = response.bytes_stream();

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(DownloadError::interrupted(file_name));
                }
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                return Ok(());
            };
            let chunk = chunk.map_err(|e| DownloadError::network(&url, e))?;

            for slice in chunk.chunks(CHUNK_SIZE) {
                if cancel.is_cancelled() {
                    return Err(DownloadError::interrupted(file_name));
                }
                writer
                    .write_all(slice)
                    .await
                    .map_err(|e| DownloadError::io(path, e))?;
                state.bytes_written += slice.len() as u64;
                self.progress.advance(slice.len() as u64);
            }
        }
    }

    fn status(&self, verb: TransferVerb, index: usize, total: usize, name: &str, rewrite: bool) {
        let severity = match verb {
            TransferVerb::Downloaded | TransferVerb::AlreadyDownloaded => Severity::Info,
            TransferVerb::Failed => Severity::Error,
            TransferVerb::Downloading | TransferVerb::Resuming => Severity::Activity,
        };
        self.console
            .report(&file_line(verb, index, total, name), severity, rewrite);
    }
}

/// Joins `dest_dir` and `file`, which must be a single plain path component.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidFileName`] for empty names, `.`/`..`,
/// absolute paths or names containing a separator.
pub fn target_path(dest_dir: &Path, file: &str) -> Result<PathBuf, DownloadError> {
    let mut components = Path::new(file).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == file => Ok(dest_dir.join(name)),
        _ => Err(DownloadError::invalid_file_name(file)),
    }
}

async fn open_target(path: &Path, append: bool) -> Result<File, DownloadError> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options
        .open(path)
        .await
        .map_err(|e| DownloadError::io(path, e))
}
