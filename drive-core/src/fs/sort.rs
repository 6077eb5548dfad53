//! ``src/fs/sort.rs``
//!
//! Canonical ordering of listed items.
//!
//! 1. On the ground floor a directory called `public` comes first.
//! 2. Directories before files.
//! 3. Case-insensitive name, ascending.
//! 4. Exact name, then path, then kind, so the order is total and a
//!    directory listed twice always comes back in the same order.

use std::cmp::Ordering;

use crate::model::item::Item;

/// Directory pinned to the top of the tree root.
pub const PINNED_ROOT_DIRECTORY: &str = "public";

#[inline]
fn is_pinned(item: &Item, is_ground_floor: bool) -> bool {
    is_ground_floor && item.is_directory() && item.name == PINNED_ROOT_DIRECTORY
}

/// Comparator for the listing at a given depth.
pub fn sorting_function(is_ground_floor: bool) -> impl Fn(&Item, &Item) -> Ordering {
    move |a: &Item, b: &Item| -> Ordering {
        // `true` sorts after `false`, hence the negations.
        (!is_pinned(a, is_ground_floor))
            .cmp(&!is_pinned(b, is_ground_floor))
            .then_with(|| (!a.is_directory()).cmp(&!b.is_directory()))
            .then_with(|| compare_case_insensitive(&a.name, &b.name))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.kind.cmp(&b.kind))
    }
}

fn compare_case_insensitive(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
