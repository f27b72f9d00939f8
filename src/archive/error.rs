//! Error types for archive browsing.

use thiserror::Error;

use crate::download::DownloadError;

/// Errors that can occur while browsing the archive's directory listings.
#[derive(Debug, Error)]
pub enum BrowseError {
    /// The base address is not an absolute http(s) URL.
    #[error("invalid archive base address: {url}")]
    InvalidBaseUrl { url: String },

    /// A listing page could not be fetched.
    #[error("failed to fetch listing {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: DownloadError,
    },

    /// The page has no `<table id="list">`.
    #[error("no directory listing found at {url}")]
    MissingListing { url: String },

    /// A menu was requested for an empty listing.
    #[error("nothing to choose from: {what}")]
    NothingToChoose { what: String },

    /// Reading the operator's selection failed (including closed input).
    #[error("failed to read selection: {source}")]
    Input {
        #[source]
        source: std::io::Error,
    },
}

impl BrowseError {
    pub fn invalid_base_url(url: impl Into<String>) -> Self {
        Self::InvalidBaseUrl { url: url.into() }
    }

    pub fn fetch(url: impl Into<String>, source: DownloadError) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    pub fn missing_listing(url: impl Into<String>) -> Self {
        Self::MissingListing { url: url.into() }
    }

    pub fn nothing_to_choose(what: impl Into<String>) -> Self {
        Self::NothingToChoose { what: what.into() }
    }

    /// Returns true when the download layer reported an operator interrupt.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Fetch { source, .. } if source.is_interrupted())
    }
}
