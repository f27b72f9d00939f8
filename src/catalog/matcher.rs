//! Reconciles wanted names with the entries available in a remote collection.

use tracing::{debug, instrument};

use super::entry::{MatchResult, RemoteIndex, WantedList};

/// Splits `wanted` into entries present in `available` and names that are not.
///
/// Output order follows `wanted`; the iteration order of `available` never
/// affects the result.
#[must_use]
#[instrument(skip_all, fields(wanted = wanted.len(), available = available.len()))]
pub fn match_entries(wanted: &WantedList, available: &RemoteIndex) -> MatchResult {
    let mut result = MatchResult::default();

    for name in wanted.iter() {
        match available.get(name) {
            Some(entry) => result.matched.push(entry.clone()),
            None => result.missing.push(name.to_string()),
        }
    }

    debug!(
        matched = result.matched.len(),
        missing = result.missing.len(),
        "catalog match complete"
    );
    result
}
