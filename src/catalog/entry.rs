//! Catalog entry types shared by the matcher, the archive browser and the downloader.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// A downloadable file discovered in a remote collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteEntry {
    /// Normalized name used as the join key against the manifest.
    pub name: String,
    /// Original remote filename, used as the local file name.
    pub file: String,
    /// Fully qualified download URL.
    pub url: String,
}

impl RemoteEntry {
    /// Creates an entry, deriving the normalized name from `file`.
    pub fn new(file: impl Into<String>, url: impl Into<String>) -> Self {
        let file = file.into();
        Self {
            name: super::strip_extension(&file).to_string(),
            file,
            url: url.into(),
        }
    }
}

/// Remote entries keyed by normalized name. Later insertions replace earlier ones.
pub type RemoteIndex = HashMap<String, RemoteEntry>;

/// Ordered, duplicate-free list of wanted normalized names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WantedList {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl WantedList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name` unless already present. Returns `true` when inserted.
    pub fn push(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.names.push(name);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl<S: Into<String>> FromIterator<S> for WantedList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for name in iter {
            list.push(name);
        }
        list
    }
}

/// Partition of the wanted names into remote hits and misses, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: Vec<RemoteEntry>,
    pub missing: Vec<String>,
}

impl MatchResult {
    /// Number of wanted names this result was built from.
    #[must_use]
    pub fn wanted(&self) -> usize {
        self.matched.len() + self.missing.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_entry_new_normalizes_name() {
        let entry = RemoteEntry::new("Foo (USA).zip", "https://host/files/Foo%20(USA).zip");
        assert_eq!(entry.name, "Foo (USA)");
        assert_eq!(entry.file, "Foo (USA).zip");
        assert_eq!(entry.url, "https://host/files/Foo%20(USA).zip");
    }

    #[test]
    fn test_wanted_list_deduplicates_preserving_order() {
        let mut list = WantedList::new();
        assert!(list.push("B"));
        assert!(list.push("A"));
        assert!(!list.push("B"));
        assert!(list.push("C"));

        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        assert!(list.contains("A"));
        assert!(!list.contains("D"));
    }

    #[test]
    fn test_wanted_list_from_iterator() {
        let list: WantedList = ["X", "Y", "X"].into_iter().collect();
        assert_eq!(list.as_slice(), &["X".to_string(), "Y".to_string()]);
        assert!(!list.is_empty());
    }
}
