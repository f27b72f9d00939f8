//! Retry logic with exponential backoff for transient download failures.
//!
//! When a download attempt fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - network, timeout, HTTP status and integrity
//!   failures; the whole size-check-and-transfer sequence is retried
//! - [`FailureType::Permanent`] - local or input problems no retry can fix
//! - [`FailureType::Cancelled`] - operator interrupt; never retried
//!
//! The [`RetryPolicy`] then decides whether another attempt is made and how
//! long to wait first.
//!
//! # Example
//!
//! ```
//! use datfetch_core::download::{DownloadError, RetryDecision, RetryPolicy, classify_error};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::default();
//! let error = DownloadError::http_status("https://example.com/Game.zip", 503);
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_secs(2));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { reason } => panic!("{reason}"),
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::DownloadError;
use super::constants::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY};

/// Each wait is twice the previous one.
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// How an attempt error bears on the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// The server or the connection may behave on the next try.
    Transient,
    /// Bad input or a local fault; another request changes nothing.
    Permanent,
    /// The operator asked the run to stop.
    Cancelled,
}

/// Outcome of [`RetryPolicy::should_retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for `delay`, then make attempt number `attempt` (1-based).
    Retry { delay: Duration, attempt: u32 },

    /// Give up on the file.
    DoNotRetry { reason: String },
}

/// Attempt budget and backoff schedule for one file.
///
/// The default allows 5 attempts with waits of exactly 2s, 4s, 8s and 16s
/// between them (60s cap, no jitter).
///
/// ```text
/// delay = min(base_delay * multiplier^(attempt - 1), max_delay) + jitter
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Counts the first attempt.
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
    /// Upper bound of the uniform jitter added to each wait.
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_jitter: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Builds a jitter-free policy.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
            max_jitter: Duration::ZERO,
        }
    }

    /// Default schedule with a different attempt budget (at least 1).
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Replaces the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Adds up to `max_jitter` of random delay to every backoff.
    #[must_use]
    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure".to_string(),
                };
            }
            FailureType::Cancelled => {
                return RetryDecision::DoNotRetry {
                    reason: "cancelled by operator".to_string(),
                };
            }
            FailureType::Transient => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        let next = attempt + 1;
        debug!(attempt, next, delay_ms = delay.as_millis(), "scheduling another attempt");
        RetryDecision::Retry {
            delay,
            attempt: next,
        }
    }

    /// Backoff before the attempt after `attempt`, without jitter.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let jitter = if self.max_jitter.is_zero() {
            Duration::ZERO
        } else {
            let ceiling = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
            Duration::from_millis(rand::thread_rng().gen_range(0..=ceiling))
        };
        self.backoff_for(attempt) + jitter
    }
}

/// Classifies a download error into a failure type for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Network, Timeout | Transient |
/// | HttpStatus (any) | Transient |
/// | Integrity | Transient - the next attempt rechecks sizes and resumes or restarts |
/// | RemoteSizeUnknown | Permanent |
/// | Io, InvalidUrl, InvalidFileName, ClientBuild | Permanent |
/// | Interrupted | Cancelled |
/// | Failed | classification of the wrapped error |
#[instrument]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::Network { .. }
        | DownloadError::Timeout { .. }
        | DownloadError::HttpStatus { .. }
        | DownloadError::Integrity { .. } => FailureType::Transient,

        DownloadError::RemoteSizeUnknown { .. }
        | DownloadError::Io { .. }
        | DownloadError::InvalidUrl { .. }
        | DownloadError::InvalidFileName { .. }
        | DownloadError::ClientBuild(_) => FailureType::Permanent,

        DownloadError::Interrupted { .. } => FailureType::Cancelled,

        DownloadError::Failed { source, .. } => classify_error(source),
    }
}
