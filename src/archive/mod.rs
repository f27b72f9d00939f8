//! Browsing the archive's HTML directory listings.
//!
//! The archive root lists catalogs (No-Intro, Redump, ...), each catalog lists
//! system collections, and each collection lists the downloadable files.
//! [`ArchiveBrowser`] fetches these pages; [`parse_listing`] turns one into
//! `(title, href)` rows and [`build_remote_index`] turns a collection into the
//! name-keyed index the matcher consumes.

mod browser;
mod error;
mod listing;
mod select;

pub use browser::ArchiveBrowser;
pub use error::BrowseError;
pub use listing::{
    ListingEntry, build_remote_index, find_catalog, find_collections, join_url, parse_listing,
};
pub use select::{choose_entry, select_catalog, select_collection};
