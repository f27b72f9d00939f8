//! Error types for manifest loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a DAT manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("cannot read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest has no `<header>` block with a `<name>`.
    #[error("manifest has no <header> with a <name>; is this a DAT file?")]
    MissingHeader,
}

impl ManifestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
