//! ``src/model/listing.rs``
//!
//! The outcome of one directory listing and the context a listing request
//! is issued with.

use std::fmt;

use compact_str::CompactString;

use crate::fs::sort::sorting_function;
use crate::model::{
    item::Item,
    route::{PathSegments, floor_for},
};

/// Whether a listing is the first one after entering a root or an in-place
/// refresh of a tree that is already shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    Initial,
    Additional,
}

impl fmt::Display for ListingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Additional => write!(f, "additional"),
        }
    }
}

/// Identifies which outstanding request a response belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequestContext {
    pub path_segments: PathSegments,
    pub mode: ListingMode,
}

/// A successfully listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Depth of the listed directory, root = 1.
    pub floor: u32,

    /// Items in canonical order.
    pub items: Vec<Item>,
}

impl Listing {
    /// Sorts `items` for the directory at `path_segments`.
    #[must_use]
    pub fn new(path_segments: &[CompactString], mut items: Vec<Item>) -> Self {
        let floor = floor_for(path_segments);
        items.sort_by(sorting_function(floor == 1));
        Self { floor, items }
    }

    /// Nothing listed yet, at the root.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            floor: 1,
            items: Vec::new(),
        }
    }
}

/// Either a listing or the message explaining why there is none. The view
/// never holds a partially populated listing.
pub type ListingResult = Result<Listing, CompactString>;
