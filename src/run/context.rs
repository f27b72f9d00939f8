//! Run-scoped state passed through the coordinator.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

/// Everything one run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct RunContext {
    dest_dir: PathBuf,
    list_only: bool,
    cancel: CancellationToken,
}

impl RunContext {
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            list_only: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Only report matches and misses; transfer nothing.
    #[must_use]
    pub fn with_list_only(mut self, list_only: bool) -> Self {
        self.list_only = list_only;
        self
    }

    /// Uses an existing token, e.g. one shared with a signal handler.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    #[must_use]
    pub fn list_only(&self) -> bool {
        self.list_only
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Requests the run to stop; the current transfer ends at the next chunk.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
