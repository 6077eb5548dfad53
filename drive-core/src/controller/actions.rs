//! src/controller/actions.rs
//! ============================================================================
//! # Actions and Commands
//!
//! `Action` is everything the application reacts to: navigation, user
//! requests, backend answers and timer callbacks. The dispatcher turns each
//! action into state changes plus a list of `Command`s, the side effects the
//! event loop runs on its behalf. Results of commands come back as actions.

use compact_str::CompactString;
use serde_json::Value;

use crate::fs::normalize::EntrySource;
use crate::model::{
    listing::ListingRequestContext,
    route::{PathSegments, Roots, Route},
    ui_state::Notification,
};
use crate::util::debounce::{DebounceConcern, SettleTimer};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Move to a new route.
    Navigate(Route),

    /// Re-list the current directory in place.
    Refresh,

    /// Re-issue the current listing after an error.
    Retry,

    /// Raw listing payload, tagged with the backend that produced it.
    GotDirectoryList { source: EntrySource, payload: Value },

    /// Transport failure of a listing request.
    GotListingError(CompactString),

    /// Text typed on the explore screen.
    GotAddressInput(CompactString),

    /// Resolve the typed address now.
    SubmitAddress,

    GotResolvedAddress(Roots),

    GotResolveError(CompactString),

    /// Create a directory with this name in the current directory.
    CreateDirectory { name: CompactString },

    RenameItem {
        path: PathSegments,
        new_name: CompactString,
    },

    RemoveItem { path: PathSegments },

    /// Outcome of the running mutation.
    OperationFinished(Result<(), CompactString>),

    Select(PathSegments),

    Deselect,

    ToggleSidebar,

    ShowNotification(Notification),

    DismissNotifications,

    ShowLoadingOverlay,

    /// Apply `action` now and restart the quiet period of `concern`.
    Debounce {
        concern: DebounceConcern,
        action: Box<Action>,
    },

    /// A settle timer fired.
    DebounceSettled {
        concern: DebounceConcern,
        generation: u64,
    },

    Quit,
}

impl Action {
    #[must_use]
    pub fn debounced(concern: DebounceConcern, action: Self) -> Self {
        Self::Debounce {
            concern,
            action: Box::new(action),
        }
    }

    /// Typing on the explore screen; the address is resolved once typing pauses.
    #[must_use]
    pub fn type_address(input: impl Into<CompactString>) -> Self {
        Self::debounced(
            DebounceConcern::AddressCheck,
            Self::GotAddressInput(input.into()),
        )
    }

    #[must_use]
    pub fn drive_listing(payload: Value) -> Self {
        Self::GotDirectoryList {
            source: EntrySource::Drive,
            payload,
        }
    }

    #[must_use]
    pub fn public_listing(payload: Value) -> Self {
        Self::GotDirectoryList {
            source: EntrySource::PublicTree,
            payload,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::Refresh => "refresh",
            Self::Retry => "retry",
            Self::GotDirectoryList { .. } => "got_directory_list",
            Self::GotListingError(_) => "got_listing_error",
            Self::GotAddressInput(_) => "got_address_input",
            Self::SubmitAddress => "submit_address",
            Self::GotResolvedAddress(_) => "got_resolved_address",
            Self::GotResolveError(_) => "got_resolve_error",
            Self::CreateDirectory { .. } => "create_directory",
            Self::RenameItem { .. } => "rename_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::OperationFinished(_) => "operation_finished",
            Self::Select(_) => "select",
            Self::Deselect => "deselect",
            Self::ToggleSidebar => "toggle_sidebar",
            Self::ShowNotification(_) => "show_notification",
            Self::DismissNotifications => "dismiss_notifications",
            Self::ShowLoadingOverlay => "show_loading_overlay",
            Self::Debounce { .. } => "debounce",
            Self::DebounceSettled { .. } => "debounce_settled",
            Self::Quit => "quit",
        }
    }
}

/// Side effects requested by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List a directory of the local drive.
    RequestListing(ListingRequestContext),

    /// List a directory of a public tree. The context's segments start with
    /// the resolved root.
    RequestPublicListing {
        context: ListingRequestContext,
        root: CompactString,
    },

    ResolveAddress(CompactString),

    StoreRoots(Roots),

    RemoveStoredRoots,

    CreateDirectory { path: PathSegments },

    Rename {
        path: PathSegments,
        new_name: CompactString,
    },

    Remove { path: PathSegments },

    ScheduleSettle(SettleTimer),

    /// Best effort; nothing reports back.
    ScrollToTop,
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RequestListing(_) => "request_listing",
            Self::RequestPublicListing { .. } => "request_public_listing",
            Self::ResolveAddress(_) => "resolve_address",
            Self::StoreRoots(_) => "store_roots",
            Self::RemoveStoredRoots => "remove_stored_roots",
            Self::CreateDirectory { .. } => "create_directory",
            Self::Rename { .. } => "rename",
            Self::Remove { .. } => "remove",
            Self::ScheduleSettle(_) => "schedule_settle",
            Self::ScrollToTop => "scroll_to_top",
        }
    }
}
