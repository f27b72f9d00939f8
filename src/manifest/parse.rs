//! Regex-based extraction of the header and game names from DAT XML.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::{Manifest, ManifestError};
use crate::catalog::{WantedList, strip_extension, strip_postfixes};
use crate::markup::decode_entities;

/// Catalog homepages found in DAT headers, mapped to the archive's catalog names.
pub const CATALOG_URLS: &[(&str, &str)] = &[
    ("https://www.no-intro.org", "No-Intro"),
    ("http://redump.org/", "Redump"),
];

#[allow(clippy::expect_used)]
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<header\b[^>]*>(.*?)</header>").expect("header regex is valid")
});

#[allow(clippy::expect_used)]
static HEADER_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<name>(.*?)</name>").expect("name regex is valid"));

#[allow(clippy::expect_used)]
static HEADER_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<url>(.*?)</url>").expect("url regex is valid"));

#[allow(clippy::expect_used)]
static GAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<game\b[^>]*?\bname\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("game regex is valid")
});

/// Parses DAT XML into a [`Manifest`].
///
/// Each configured postfix is removed from the header name. Game names are
/// entity-decoded, extension-stripped and deduplicated in document order.
///
/// # Errors
///
/// Returns [`ManifestError::MissingHeader`] when no header name is present.
#[tracing::instrument(skip(xml, postfixes), fields(xml_len = xml.len()))]
pub fn parse_manifest<S: AsRef<str>>(xml: &str, postfixes: &[S]) -> Result<Manifest, ManifestError> {
    let header = HEADER_PATTERN
        .captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ManifestError::MissingHeader)?;

    let raw_name = capture_text(&HEADER_NAME_PATTERN, header).ok_or(ManifestError::MissingHeader)?;
    let system = strip_postfixes(raw_name.trim(), postfixes);
    let catalog_url = capture_text(&HEADER_URL_PATTERN, header).map(|url| url.trim().to_string());
    let catalog = catalog_url.as_deref().and_then(catalog_for_url).map(str::to_string);

    let mut wanted = WantedList::new();
    for caps in GAME_PATTERN.captures_iter(xml) {
        let Some(raw) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let decoded = decode_entities(raw.as_str());
        let name = strip_extension(&decoded);
        if wanted.push(name) {
            trace!(name, "wanted entry");
        }
    }

    debug!(
        system = %system,
        catalog = ?catalog,
        wanted = wanted.len(),
        "parsed manifest"
    );

    Ok(Manifest {
        system,
        catalog,
        catalog_url,
        wanted,
    })
}

/// Looks up the catalog name for a DAT header URL (exact match).
#[must_use]
pub fn catalog_for_url(url: &str) -> Option<&'static str> {
    CATALOG_URLS
        .iter()
        .find(|(known, _)| *known == url)
        .map(|(_, name)| *name)
}

fn capture_text(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()).into_owned())
}
