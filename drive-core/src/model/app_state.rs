// drive-core/src/model/app_state.rs
// The single owned application state, mutated only by the dispatcher

use compact_str::CompactString;
use tracing::{debug, info, instrument};

use crate::config::DebounceConfig;
use crate::controller::{actions::Command, tracker::ListingTracker};
use crate::model::{
    listing::{Listing, ListingResult},
    route::{PathSegments, Roots, Route},
    status::{BackendStatus, OperationKind},
    ui_state::UIState,
};
use crate::util::debounce::{DebounceConcern, DebounceRegistry, DebounceSlot, DebouncerState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub route: Route,

    /// Resolution of the current (or last) public address.
    pub roots: Option<Roots>,

    pub status: BackendStatus,

    /// Mutation awaiting its outcome. Outlives listings started meanwhile.
    pub operation: Option<OperationKind>,

    /// The one outcome currently shown.
    pub listing: ListingResult,

    /// Depth of the shown directory, root = 1.
    pub floor: u32,

    /// Derived from the last applied listing.
    pub selected_path: Option<PathSegments>,

    pub tracker: ListingTracker,

    pub ui: UIState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AppState {
    #[must_use]
    pub fn new(stored_roots: Option<Roots>) -> Self {
        Self {
            route: Route::Undecided,
            roots: stored_roots,
            status: BackendStatus::NotNeeded,
            operation: None,
            listing: Ok(Listing::empty()),
            floor: 1,
            selected_path: None,
            tracker: ListingTracker::new(),
            ui: UIState::new(),
        }
    }

    /// Roots that serve the current route, if it is a public tree.
    #[must_use]
    pub fn active_roots(&self) -> Option<&Roots> {
        let address = self.route.address()?;
        self.roots.as_ref().filter(|roots| roots.serves(address))
    }

    /// Back to an empty listing at the root.
    pub fn reset_listing(&mut self) {
        self.listing = Ok(Listing::empty());
        self.floor = 1;
        self.selected_path = None;
    }

    /// Replace the shown outcome and everything derived from it.
    #[instrument(level = "debug", skip_all)]
    pub fn apply_listing(
        &mut self,
        debounce: &DebounceRegistry<Self>,
        result: ListingResult,
    ) -> Vec<Command> {
        self.floor = match &result {
            Ok(listing) => listing.floor,
            Err(_) => self.route.floor(),
        };

        self.selected_path = derive_selection(&result, self.route.last_segment());
        self.ui.expand_sidebar = self.selected_path.is_some();
        self.listing = result;

        self.ui.show_loading_overlay = false;
        debounce.cancel(self, DebounceConcern::LoadingOverlay);

        if let Some(path) = &self.selected_path {
            info!(
                marker = "SELECTION_DERIVED",
                path = %path.join("/"),
                "Selected deep-linked item"
            );
        }

        debug!(marker = "LISTING_APPLIED", floor = self.floor, "Listing applied");

        vec![Command::ScrollToTop]
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.listing.as_ref().map_or(0, |listing| listing.items.len())
    }

    #[must_use]
    pub fn listing_error(&self) -> Option<&CompactString> {
        self.listing.as_ref().err()
    }
}

/// Exactly one item named like the route's last segment gets selected.
fn derive_selection(result: &ListingResult, last_segment: Option<&str>) -> Option<PathSegments> {
    let (Ok(listing), Some(last)) = (result, last_segment) else {
        return None;
    };

    let mut matches = listing.items.iter().filter(|item| item.name == last);
    let only = matches.next()?;

    if matches.next().is_some() {
        return None;
    }

    Some(only.path.clone())
}

const fn read_loading(state: &AppState) -> &DebouncerState {
    &state.ui.loading_debounce
}

const fn write_loading(state: &mut AppState) -> &mut DebouncerState {
    &mut state.ui.loading_debounce
}

const fn read_notification(state: &AppState) -> &DebouncerState {
    &state.ui.notification_debounce
}

const fn write_notification(state: &mut AppState) -> &mut DebouncerState {
    &mut state.ui.notification_debounce
}

const fn read_address(state: &AppState) -> &DebouncerState {
    &state.ui.address_debounce
}

const fn write_address(state: &mut AppState) -> &mut DebouncerState {
    &mut state.ui.address_debounce
}

/// Registers the debounced concerns of [`AppState`].
#[must_use]
pub fn debounce_registry(config: &DebounceConfig) -> DebounceRegistry<AppState> {
    DebounceRegistry::new(|concern| {
        let settle = concern.settle_duration(config);
        match concern {
            DebounceConcern::LoadingOverlay => DebounceSlot {
                read: read_loading,
                write: write_loading,
                settle,
            },
            DebounceConcern::Notification => DebounceSlot {
                read: read_notification,
                write: write_notification,
                settle,
            },
            DebounceConcern::AddressCheck => DebounceSlot {
                read: read_address,
                write: write_address,
                settle,
            },
        }
    })
}
