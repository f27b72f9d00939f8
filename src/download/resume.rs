//! Resume-versus-restart decisions from local and remote sizes.

use std::path::Path;

use super::DownloadError;

/// What a download attempt has to do, given what is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPlan {
    /// Local size equals remote size; nothing to transfer.
    AlreadyComplete,
    /// No usable local data; stream the whole body.
    Fresh,
    /// Local prefix of `offset` bytes; request `bytes=offset-` and append.
    Resume { offset: u64 },
    /// Local file is larger than the remote one; truncate and stream from byte 0.
    Restart,
}

/// Decides the plan for one attempt.
///
/// Only an exact size match counts as complete. A zero-byte local file is a
/// fresh start rather than a resume from offset 0.
#[must_use]
pub fn plan_transfer(local_size: Option<u64>, remote_size: u64) -> TransferPlan {
    match local_size {
        Some(local) if local == remote_size => TransferPlan::AlreadyComplete,
        Some(local) if local > remote_size => TransferPlan::Restart,
        Some(local) if local > 0 => TransferPlan::Resume { offset: local },
        Some(_) | None => TransferPlan::Fresh,
    }
}

/// Per-attempt transfer bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferState {
    pub local_size: u64,
    pub remote_size: u64,
    pub resuming: bool,
    pub bytes_written: u64,
}

impl TransferState {
    #[must_use]
    pub fn new(local_size: u64, remote_size: u64, resuming: bool) -> Self {
        Self {
            local_size,
            remote_size,
            resuming,
            bytes_written: 0,
        }
    }

    /// Bytes the file holds so far: the kept prefix plus everything streamed.
    #[must_use]
    pub fn position(&self) -> u64 {
        if self.resuming {
            self.local_size.saturating_add(self.bytes_written)
        } else {
            self.bytes_written
        }
    }

    /// Bytes the progress counter starts from.
    #[must_use]
    pub fn initial_position(&self) -> u64 {
        if self.resuming { self.local_size } else { 0 }
    }

    /// Returns to a fresh transfer, e.g. after the server ignored a range request.
    pub fn restart(&mut self) {
        self.resuming = false;
        self.local_size = 0;
        self.bytes_written = 0;
    }
}

/// Size of the file at `path`, or `None` when it does not exist.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] for metadata failures other than not-found,
/// or when `path` exists but is not a regular file.
pub async fn local_size(path: &Path) -> Result<Option<u64>, DownloadError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
        Ok(_) => Err(DownloadError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DownloadError::io(path, e)),
    }
}
