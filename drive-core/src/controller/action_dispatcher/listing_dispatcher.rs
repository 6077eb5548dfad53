// drive-core/src/controller/action_dispatcher/listing_dispatcher.rs
// Navigation, listing requests and listing responses

use compact_str::CompactString;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::controller::actions::{Action, Command};
use crate::controller::tracker::{ListingTracker, Verdict};
use crate::error::AppError;
use crate::fs::{
    normalize::{EntrySource, normalize},
    payload::ListingPayload,
};
use crate::model::{
    listing::{Listing, ListingMode},
    route::{PathSegments, Route},
    status::BackendStatus,
};
use crate::util::debounce::DebounceConcern;

use super::{ActionHandler, ActionMatcher, ActionPriority, DispatchContext, DispatchResult};

#[derive(Debug, Clone, Default)]
pub struct ListingDispatcher;

impl ListingDispatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[instrument(level = "info", skip_all, fields(route = %route))]
    fn navigate(ctx: &mut DispatchContext<'_>, route: Route) -> Vec<Command> {
        ctx.state.route = route;

        if ctx.state.route.needs_tree() {
            return issue_current_listing(ctx);
        }

        info!(marker = "EXPLORE_ENTERED", "Leaving trees for the explore screen");

        ctx.state.roots = None;
        ctx.state.status = BackendStatus::NotNeeded;
        ctx.state.reset_listing();
        ctx.state.tracker.reset();
        ctx.stop_loading();

        vec![Command::RemoveStoredRoots]
    }

    fn retry(ctx: &mut DispatchContext<'_>) -> Vec<Command> {
        if !ctx.state.route.needs_tree() {
            return Vec::new();
        }

        info!(marker = "LISTING_RETRY", route = %ctx.state.route, "Retrying listing");
        ctx.state.tracker.reset();
        issue_current_listing(ctx)
    }

    #[instrument(level = "debug", skip_all)]
    fn got_directory_list(
        ctx: &mut DispatchContext<'_>,
        source: EntrySource,
        value: &Value,
    ) -> Vec<Command> {
        if ListingTracker::source_for(&ctx.state.route) != Some(source) {
            debug!(
                marker = "LISTING_STALE",
                source = ?source,
                route = %ctx.state.route,
                "Listing arrived from a backend the route does not use"
            );
            return Vec::new();
        }

        let payload = match ListingPayload::decode(value) {
            Ok(payload) => payload,
            Err(e) => {
                fail_listing(ctx, &e);
                return Vec::new();
            }
        };

        let verdict = ctx.state.tracker.accept_response(
            &ctx.state.status,
            &ctx.state.route,
            ctx.state.roots.as_ref(),
            source,
            &payload.path_segments,
        );

        if verdict == Verdict::Discard {
            return Vec::new();
        }

        let relative = relative_segments(&ctx.state.route, &payload.path_segments);

        let (result, outcome) = match payload.error {
            Some(message) => (Err(message.clone()), Err(message)),
            None => {
                let items = normalize(source, &payload.results, &relative);
                (Ok(Listing::new(&relative, items)), Ok(()))
            }
        };

        let commands = ctx.state.apply_listing(ctx.debounce, result);

        match outcome {
            Ok(()) => match ctx.state.operation {
                Some(kind) => ctx.state.status.resume_operation(kind),
                None => ctx.state.status.listing_succeeded(),
            },
            Err(message) => ctx.state.status.fail(message),
        }

        commands
    }

    fn got_listing_error(ctx: &mut DispatchContext<'_>, message: CompactString) -> Vec<Command> {
        if ctx.state.status.is_listing() {
            fail_listing(ctx, &AppError::backend("listing", message));
            return Vec::new();
        }

        warn!(
            marker = "LISTING_ERROR_IGNORED",
            status = %ctx.state.status,
            error = %message,
            "Listing error with no listing outstanding"
        );
        vec![ctx.error(message)]
    }
}

/// Issue the listing for the current route, or start resolving its address.
pub(super) fn issue_current_listing(ctx: &mut DispatchContext<'_>) -> Vec<Command> {
    let state = &mut *ctx.state;
    let mode = state.tracker.mode_for(&state.route);

    if mode == ListingMode::Initial {
        state.reset_listing();
    }

    let mut commands = Vec::with_capacity(2);

    match state.tracker.issue_listing(&state.route, state.roots.as_ref()) {
        Some(request) => {
            state.status.begin_listing(mode);
            commands.push(request);
        }
        None => match &state.route {
            Route::Tree { address, .. } => {
                debug!(
                    marker = "ADDRESS_UNRESOLVED",
                    address = %address,
                    "Resolving before listing"
                );
                state.status = BackendStatus::InitialListing;
                commands.push(Command::ResolveAddress(address.clone()));
            }
            _ => return commands,
        },
    }

    commands.push(ctx.debounce(DebounceConcern::LoadingOverlay));
    commands
}

/// Decode or transport failure: status goes to Error, the listing stays.
fn fail_listing(ctx: &mut DispatchContext<'_>, error: &AppError) {
    ctx.stop_loading();
    ctx.state.status.fail(error.to_string());
}

/// Response segments below the tree root.
fn relative_segments(route: &Route, segments: &[CompactString]) -> PathSegments {
    let skip = usize::from(matches!(route, Route::Tree { .. }));
    segments.iter().skip(skip).cloned().collect()
}

impl ActionMatcher for ListingDispatcher {
    fn can_handle(&self, action: &Action) -> bool {
        matches!(
            action,
            Action::Navigate(_)
                | Action::Refresh
                | Action::Retry
                | Action::GotDirectoryList { .. }
                | Action::GotListingError(_)
        )
    }

    fn priority(&self) -> ActionPriority {
        ActionPriority::High
    }

    fn name(&self) -> &'static str {
        "listing"
    }
}

impl ActionHandler for ListingDispatcher {
    fn handle(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        action: Action,
    ) -> Result<DispatchResult, AppError> {
        let commands = match action {
            Action::Navigate(route) => Self::navigate(ctx, route),
            Action::Refresh | Action::Retry if ctx.state.operation.is_some() => {
                debug!(
                    marker = "REFRESH_DEFERRED",
                    status = %ctx.state.status,
                    "Operation running"
                );
                Vec::new()
            }
            Action::Refresh => issue_current_listing(ctx),
            Action::Retry => Self::retry(ctx),
            Action::GotDirectoryList { source, payload } => {
                Self::got_directory_list(ctx, source, &payload)
            }
            Action::GotListingError(message) => Self::got_listing_error(ctx, message),
            _ => return Ok(DispatchResult::NotHandled),
        };

        Ok(DispatchResult::Continue(commands))
    }
}
