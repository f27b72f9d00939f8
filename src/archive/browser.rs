//! Fetches directory listings from the archive.

use tracing::{debug, instrument};
use url::Url;

use super::error::BrowseError;
use super::listing::{ListingEntry, join_url, listing_table, parse_listing};
use crate::download::HttpClient;

/// Lists directories below a fixed base address.
#[derive(Debug, Clone)]
pub struct ArchiveBrowser {
    client: HttpClient,
    base_url: String,
}

impl ArchiveBrowser {
    /// Creates a browser rooted at `base_url`. A trailing `/` is added if missing.
    ///
    /// # Errors
    ///
    /// Returns [`BrowseError::InvalidBaseUrl`] unless `base_url` is an absolute
    /// http or https URL.
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self, BrowseError> {
        let parsed = Url::parse(base_url).map_err(|_| BrowseError::invalid_base_url(base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BrowseError::invalid_base_url(base_url));
        }

        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Fetches and parses the listing at `base_url` + `segments`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowseError::Fetch`] when the request fails and
    /// [`BrowseError::MissingListing`] when the page has no listing table.
    #[instrument(skip(self))]
    pub async fn list(&self, segments: &[&str]) -> Result<Vec<ListingEntry>, BrowseError> {
        let url = join_url(&self.base_url, segments);
        let html = self
            .client
            .fetch_text(&url)
            .await
            .map_err(|e| BrowseError::fetch(&url, e))?;

        if listing_table(&html).is_none() {
            return Err(BrowseError::missing_listing(url));
        }
        let entries = parse_listing(&html);
        debug!(url = %url, count = entries.len(), "listing fetched");
        Ok(entries)
    }
}
