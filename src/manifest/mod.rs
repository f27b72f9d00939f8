//! DAT manifest loading.
//!
//! A manifest supplies the system label (header name, postfixes removed), the
//! catalog it was generated from (when the header URL is recognised) and the
//! ordered list of wanted, normalized entry names.

mod error;
mod parse;

use std::path::Path;

use crate::catalog::WantedList;

pub use error::ManifestError;
pub use parse::{CATALOG_URLS, catalog_for_url, parse_manifest};

/// Parsed DAT manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// System label used to find the remote collection.
    pub system: String,
    /// Catalog name on the archive, when the header URL is recognised.
    pub catalog: Option<String>,
    /// Raw header URL.
    pub catalog_url: Option<String>,
    /// Wanted normalized names, in manifest order.
    pub wanted: WantedList,
}

/// Reads and parses a manifest file.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] when the file cannot be read and
/// [`ManifestError::MissingHeader`] when it is not a DAT file.
pub fn load_manifest<S: AsRef<str>>(path: &Path, postfixes: &[S]) -> Result<Manifest, ManifestError> {
    let raw = std::fs::read(path).map_err(|e| ManifestError::io(path, e))?;
    let xml = String::from_utf8_lossy(&raw);
    parse_manifest(&xml, postfixes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_POSTFIXES;
    use tempfile::TempDir;

    #[test]
    fn test_load_manifest_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gb.dat");
        std::fs::write(
            &path,
            r#"<datafile><header><name>GB (Retool)</name></header><game name="Foo"/></datafile>"#,
        )
        .unwrap();

        let manifest = load_manifest(&path, DEFAULT_POSTFIXES).unwrap();
        assert_eq!(manifest.system, "GB");
        assert_eq!(manifest.wanted.len(), 1);
    }

    #[test]
    fn test_load_manifest_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_manifest(&dir.path().join("absent.dat"), DEFAULT_POSTFIXES);
        match result {
            Err(ManifestError::Io { path, .. }) => assert!(path.ends_with("absent.dat")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
