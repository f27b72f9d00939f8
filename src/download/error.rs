//! Error types for the download module.
//!
//! Every variant carries the URL or path it relates to so that a failure can be
//! reported without further context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while probing or transferring a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, stream reset, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout { url: String },

    /// Unexpected HTTP response status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    /// The initial response carried no usable Content-Length header.
    #[error("server did not report a size for {url}")]
    RemoteSizeUnknown { url: String },

    /// File system error while opening, truncating or writing the local file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The remote file name cannot be used as a single local path component.
    #[error("refusing unsafe file name: {file}")]
    InvalidFileName { file: String },

    /// The file on disk does not have the size the server announced.
    #[error(
        "integrity check failed for {path}: expected {expected_bytes} bytes, got {actual_bytes}"
    )]
    Integrity {
        path: PathBuf,
        expected_bytes: u64,
        actual_bytes: u64,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The operator cancelled the run while this file was in progress.
    #[error("download of {file} interrupted")]
    Interrupted { file: String },

    /// A file was abandoned after its last attempt failed.
    #[error("download of {file} failed after {attempts} attempt(s): {source}")]
    Failed {
        file: String,
        attempts: u32,
        #[source]
        source: Box<DownloadError>,
    },
}

impl DownloadError {
    /// Creates a network error, mapping reqwest timeouts to [`DownloadError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn remote_size_unknown(url: impl Into<String>) -> Self {
        Self::RemoteSizeUnknown { url: url.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn invalid_file_name(file: impl Into<String>) -> Self {
        Self::InvalidFileName { file: file.into() }
    }

    pub fn integrity(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    pub fn interrupted(file: impl Into<String>) -> Self {
        Self::Interrupted { file: file.into() }
    }

    pub fn failed(file: impl Into<String>, attempts: u32, source: DownloadError) -> Self {
        Self::Failed {
            file: file.into(),
            attempts,
            source: Box::new(source),
        }
    }

    /// Returns true when the operator requested cancellation.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path the source error lacks.
