//! Constants for the download module (chunking, timeouts, retry schedule).

use std::time::Duration;

/// Bytes written to disk per slice of the response stream.
pub const CHUNK_SIZE: usize = 8192;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default attempts per file, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Delay before the first retry; doubled for each further retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Upper bound for a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default HTTP file archive the catalogs are browsed from.
pub const DEFAULT_BASE_URL: &str = "https://myrient.erista.me/files/";
