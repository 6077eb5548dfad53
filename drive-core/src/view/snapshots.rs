//! src/view/snapshots.rs
//! ============================================================
//! Immutable copies of the live [`AppState`], published by the
//! event loop after every action and consumed by whatever draws
//! the directory (the CLI printer, tests).
//!
//! Debounce bookkeeping and the request tracker stay behind; a
//! snapshot only carries what a view shows.

use crate::model::{
    app_state::AppState,
    item::Item,
    listing::ListingResult,
    route::{PathSegments, Route},
    status::BackendStatus,
    ui_state::Notification,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub route: Route,

    pub status: BackendStatus,

    /// Depth of the shown directory
    pub floor: u32,

    pub listing: ListingResult,

    pub selected_path: Option<PathSegments>,

    pub show_loading_overlay: bool,

    pub expand_sidebar: bool,

    /// Most recent toast, if any
    pub notification: Option<Notification>,

    /// Times the view was asked to scroll back to the top
    pub scroll_requests: u64,
}

impl Default for DirectorySnapshot {
    fn default() -> Self {
        Self::capture(&AppState::default(), 0)
    }
}

impl DirectorySnapshot {
    #[must_use]
    pub fn capture(state: &AppState, scroll_requests: u64) -> Self {
        Self {
            route: state.route.clone(),
            status: state.status.clone(),
            floor: state.floor,
            listing: state.listing.clone(),
            selected_path: state.selected_path.clone(),
            show_loading_overlay: state.ui.show_loading_overlay,
            expand_sidebar: state.ui.expand_sidebar,
            notification: state.ui.latest_notification().cloned(),
            scroll_requests,
        }
    }

    /// Ready or Error: the listing for the route will not change on its own.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self.status, BackendStatus::Ready | BackendStatus::Error(_))
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        match &self.listing {
            Ok(listing) => &listing.items,
            Err(_) => &[],
        }
    }
}
