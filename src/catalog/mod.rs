//! Manifest-to-archive matching.
//!
//! - [`normalize`] strips extensions and manifest postfixes
//! - [`entry`] holds the wanted/remote entry types
//! - [`matcher`] partitions wanted names into matched and missing

pub mod entry;
pub mod matcher;
pub mod normalize;

pub use entry::{MatchResult, RemoteEntry, RemoteIndex, WantedList};
pub use matcher::match_entries;
pub use normalize::{DEFAULT_POSTFIXES, strip_extension, strip_postfixes};
