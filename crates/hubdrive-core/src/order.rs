//! Listing order for Drive items.
//!
//! Folders always come before files. Within each group, names are compared
//! with a locale-style collation in levels:
//!
//! 1. base letters, ignoring accents and case (`Ärger` sorts with `arger`)
//! 2. accents: unaccented before accented
//! 3. case: lowercase before uppercase
//! 4. raw code points
//!
//! The item ID breaks any remaining tie, so the order is total and identical
//! inputs always produce identical output.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::item::DriveItem;

/// Compares two names using the listing collation.
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| with_accents(a).cmp(with_accents(b)))
        .then_with(|| case_tiebreak(a, b))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn with_accents(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Lowercase sorts before uppercase at the first differing position.
fn case_tiebreak(a: &str, b: &str) -> Ordering {
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// Compares two items: folders first, then by name, then by ID.
pub fn compare_items(a: &DriveItem, b: &DriveItem) -> Ordering {
    b.is_folder()
        .cmp(&a.is_folder())
        .then_with(|| collate(&a.name, &b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts items in listing order.
pub fn sort_items(items: &mut [DriveItem]) {
    items.sort_by(compare_items);
}

/// Returns a sorted copy of the given items.
pub fn sorted(mut items: Vec<DriveItem>) -> Vec<DriveItem> {
    sort_items(&mut items);
    items
}

/// Inserts an item at its ordered position in an already sorted list.
pub fn insert_sorted(items: &mut Vec<DriveItem>, item: DriveItem) {
    let position = items
        .binary_search_by(|existing| compare_items(existing, &item))
        .unwrap_or_else(|pos| pos);
    items.insert(position, item);
}
