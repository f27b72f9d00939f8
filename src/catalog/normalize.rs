//! Name normalization for matching manifest entries against remote files.

use std::sync::LazyLock;

use regex::Regex;

/// Postfixes appended to system names by manifest tooling, removed before
/// the system name is compared against remote collection titles.
pub const DEFAULT_POSTFIXES: &[&str] = &[" (Retool)"];

/// Trailing short extension: a dot followed by 1-3 ASCII alphanumerics at the end.
#[allow(clippy::expect_used)]
static EXTENSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.[A-Za-z0-9]{1,3}\z").expect("extension regex is valid") // Static pattern, safe to panic
});

/// Strips one trailing 1-3 character alphanumeric extension.
///
/// Names without such a suffix are returned unchanged, including names whose
/// final dotted segment is longer than three characters.
///
/// ```
/// use datfetch_core::catalog::strip_extension;
///
/// assert_eq!(strip_extension("Game.zip"), "Game");
/// assert_eq!(strip_extension("Game"), "Game");
/// assert_eq!(strip_extension("Game.a1b2c3"), "Game.a1b2c3");
/// ```
#[must_use]
pub fn strip_extension(name: &str) -> &str {
    match EXTENSION_PATTERN.find(name) {
        Some(found) => &name[..found.start()],
        None => name,
    }
}

/// Removes every occurrence of each postfix from a system/header name.
#[must_use]
pub fn strip_postfixes<S: AsRef<str>>(name: &str, postfixes: &[S]) -> String {
    postfixes
        .iter()
        .map(AsRef::as_ref)
        .filter(|fix| !fix.is_empty())
        .fold(name.to_string(), |acc, fix| acc.replace(fix, ""))
}
