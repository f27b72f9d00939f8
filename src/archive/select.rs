//! Interactive catalog and collection selection.

use tracing::debug;

use super::error::BrowseError;
use super::listing::{ListingEntry, find_catalog, find_collections};
use crate::report::{Console, Severity};

/// Prints a numbered menu and reads a 1-based choice until one is valid.
///
/// Returns the 0-based index of the chosen entry.
///
/// # Errors
///
/// Returns [`BrowseError::NothingToChoose`] for an empty menu and
/// [`BrowseError::Input`] when the prompt cannot be read.
pub fn choose_entry(
    console: &dyn Console,
    entries: &[&ListingEntry],
    prompt: &str,
) -> Result<usize, BrowseError> {
    if entries.is_empty() {
        return Err(BrowseError::nothing_to_choose(prompt));
    }

    for (n, entry) in entries.iter().enumerate() {
        console.report(&format!("{:<2}: {}", n + 1, entry.title), Severity::Warning, false);
    }

    loop {
        let answer = console
            .prompt(prompt)
            .map_err(|source| BrowseError::Input { source })?;
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=entries.len()).contains(&n) => {
                debug!(choice = n, title = %entries[n - 1].title, "entry selected");
                return Ok(n - 1);
            }
            _ => console.report(
                &format!("Invalid selection, enter a number from 1 to {}", entries.len()),
                Severity::Error,
                false,
            ),
        }
    }
}

/// Picks the catalog directory from the archive root listing.
///
/// The catalog named in the manifest is used unless `force_menu` is set or no
/// title contains it; the full listing is offered otherwise.
///
/// # Errors
///
/// Propagates [`choose_entry`] errors.
pub fn select_catalog<'a>(
    console: &dyn Console,
    root: &'a [ListingEntry],
    catalog: Option<&str>,
    force_menu: bool,
) -> Result<&'a ListingEntry, BrowseError> {
    if !force_menu
        && let Some(found) = catalog.and_then(|name| find_catalog(root, name))
    {
        return Ok(found);
    }

    if !force_menu {
        console.report(
            "Catalog for DAT not automatically found, please select from the following:",
            Severity::Warning,
            false,
        );
    }
    let menu: Vec<&ListingEntry> = root.iter().collect();
    let choice = choose_entry(console, &menu, "Input selected catalog number: ")?;
    Ok(menu[choice])
}

/// Picks the collection directory from a catalog listing.
///
/// A single collection whose title starts with `system` is used directly.
/// Several matches are offered as a menu; with none, or with `force_menu`,
/// the whole catalog listing is offered.
///
/// # Errors
///
/// Propagates [`choose_entry`] errors.
pub fn select_collection<'a>(
    console: &dyn Console,
    listing: &'a [ListingEntry],
    system: &str,
    force_menu: bool,
) -> Result<&'a ListingEntry, BrowseError> {
    let found = find_collections(listing, system);
    if found.len() == 1 && !force_menu {
        return Ok(found[0]);
    }

    let menu: Vec<&ListingEntry> = if found.len() > 1 && !force_menu {
        found
    } else {
        if !force_menu {
            console.report(
                "Collection for DAT not automatically found, please select from the following:",
                Severity::Warning,
                false,
            );
        }
        listing.iter().collect()
    };
    let choice = choose_entry(console, &menu, "Input selected collection number: ")?;
    Ok(menu[choice])
}
