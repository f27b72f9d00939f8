//! Resumable HTTP downloads streamed to disk.
//!
//! [`ResumableDownloader`] fetches the remote size, compares it with what is
//! already on disk and either skips, resumes with a `Range` request, or
//! streams from byte 0. The whole sequence is retried with exponential
//! backoff under a [`RetryPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use datfetch_core::catalog::RemoteEntry;
//! use datfetch_core::download::{HttpClient, ResumableDownloader, RetryPolicy};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = ResumableDownloader::new(HttpClient::new()?, RetryPolicy::default());
//! let cancel = CancellationToken::new();
//! let entry = RemoteEntry::new("Foo (USA).zip", "https://example.com/files/Foo%20(USA).zip");
//! let outcome = downloader
//!     .download(Path::new("./roms"), &entry, 1, 1, &cancel)
//!     .await?;
//! println!("{:?}: {} bytes", outcome.kind, outcome.bytes_on_disk);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod downloader;
mod error;
mod resume;
mod retry;

pub use client::{HttpClient, content_length, content_range_start};
pub use constants::{
    CHUNK_SIZE, CONNECT_TIMEOUT_SECS, DEFAULT_BASE_DELAY, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY,
};
pub use downloader::{DownloadOutcome, OutcomeKind, ResumableDownloader, target_path};
pub use error::DownloadError;
pub use resume::{TransferPlan, TransferState, local_size, plan_transfer};
pub use retry::{FailureType, RetryDecision, RetryPolicy, classify_error};
