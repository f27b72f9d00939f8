//! Directory listing extraction and catalog/collection lookup.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::catalog::{RemoteEntry, RemoteIndex};
use crate::markup::decode_entities;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    /// Display title (the anchor's `title` attribute, else its text).
    pub title: String,
    /// Link target relative to the listed directory, as found in the page.
    pub href: String,
}

impl ListingEntry {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
        }
    }

    /// True for sub-directory links.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.href.ends_with('/')
    }
}

#[allow(clippy::expect_used)]
static LIST_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<table\b[^>]*\bid\s*=\s*(?:"list"|'list')[^>]*>(.*?)</table>"#)
        .expect("listing table regex is valid")
});

#[allow(clippy::expect_used)]
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("row regex is valid"));

#[allow(clippy::expect_used)]
static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a>").expect("anchor regex is valid"));

#[allow(clippy::expect_used)]
static HREF_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("href regex is valid")
});

#[allow(clippy::expect_used)]
static TITLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\btitle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("title regex is valid")
});

#[allow(clippy::expect_used)]
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));

fn attribute(pattern: &Regex, attrs: &str) -> Option<String> {
    pattern
        .captures(attrs)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| decode_entities(m.as_str()).into_owned())
}

/// Body of the `<table id="list">` element, if the page has one.
pub(crate) fn listing_table(html: &str) -> Option<&str> {
    LIST_TABLE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extracts `(title, href)` pairs from a listing page, in page order.
///
/// Only rows of `<table id="list">` are considered, using the first anchor of
/// each row. Parent-directory links are skipped.
#[must_use]
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let Some(table) = listing_table(html) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for row in ROW.captures_iter(table) {
        let Some(anchor) = row.get(1).and_then(|body| ANCHOR.captures(body.as_str())) else {
            continue;
        };
        let attrs = anchor.get(1).map_or("", |m| m.as_str());
        let Some(href) = attribute(&HREF_ATTR, attrs) else {
            continue;
        };
        if href == "../" || href == ".." {
            continue;
        }

        let title = attribute(&TITLE_ATTR, attrs).unwrap_or_else(|| {
            let text = anchor.get(2).map_or("", |m| m.as_str());
            decode_entities(TAG.replace_all(text, "").trim()).into_owned()
        });
        entries.push(ListingEntry { title, href });
    }

    debug!(count = entries.len(), "listing parsed");
    entries
}

/// Entry whose title contains `catalog`. The last match wins.
#[must_use]
pub fn find_catalog<'a>(entries: &'a [ListingEntry], catalog: &str) -> Option<&'a ListingEntry> {
    if catalog.is_empty() {
        return None;
    }
    entries.iter().rev().find(|e| e.title.contains(catalog))
}

/// Entries whose title starts with the system label, in listing order.
#[must_use]
pub fn find_collections<'a>(entries: &'a [ListingEntry], system: &str) -> Vec<&'a ListingEntry> {
    if system.is_empty() {
        return Vec::new();
    }
    entries
        .iter()
        .filter(|e| e.title.starts_with(system))
        .collect()
}

/// Joins the base address and relative path segments by plain concatenation.
#[must_use]
pub fn join_url(base_url: &str, segments: &[&str]) -> String {
    let mut url = String::from(base_url);
    for segment in segments {
        url.push_str(segment);
    }
    url
}

/// Builds the normalized-name index of a collection listing.
///
/// Sub-directory rows are skipped. The local file name is the entry title, or
/// the percent-decoded href when the title is empty.
#[must_use]
pub fn build_remote_index(
    base_url: &str,
    segments: &[&str],
    listing: &[ListingEntry],
) -> RemoteIndex {
    let prefix = join_url(base_url, segments);
    let mut index = RemoteIndex::with_capacity(listing.len());

    for item in listing.iter().filter(|e| !e.is_directory()) {
        let file = if item.title.is_empty() {
            urlencoding::decode(&item.href)
                .map_or_else(|_| item.href.clone(), std::borrow::Cow::into_owned)
        } else {
            item.title.clone()
        };
        let entry = RemoteEntry::new(file, format!("{prefix}{}", item.href));
        index.insert(entry.name.clone(), entry);
    }

    debug!(entries = index.len(), "remote index built");
    index
}
