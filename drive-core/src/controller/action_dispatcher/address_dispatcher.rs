// drive-core/src/controller/action_dispatcher/address_dispatcher.rs
// Explore-screen input and public address resolution

use compact_str::CompactString;
use tracing::{debug, info, instrument};

use crate::controller::actions::{Action, Command};
use crate::error::AppError;
use crate::model::{
    route::{Roots, Route},
    status::BackendStatus,
};

use super::listing_dispatcher::issue_current_listing;
use super::{ActionHandler, ActionMatcher, ActionPriority, DispatchContext, DispatchResult};

#[derive(Debug, Clone, Default)]
pub struct AddressDispatcher;

impl AddressDispatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn submit(ctx: &DispatchContext<'_>) -> Vec<Command> {
        if ctx.state.route.needs_tree() {
            return Vec::new();
        }

        let input = ctx.state.ui.address_input.trim();
        if input.is_empty() {
            return Vec::new();
        }

        debug!(marker = "ADDRESS_CHECK", address = input, "Resolving typed address");
        vec![Command::ResolveAddress(CompactString::new(input))]
    }

    #[instrument(level = "info", skip_all, fields(address = %roots.unresolved))]
    fn resolved(ctx: &mut DispatchContext<'_>, roots: Roots) -> Vec<Command> {
        match &ctx.state.route {
            Route::Tree { address, .. } if roots.serves(address) => {
                info!(
                    marker = "ADDRESS_RESOLVED",
                    resolved = %roots.resolved,
                    is_dns_link = roots.is_dns_link,
                    "Tree root resolved"
                );
                ctx.state.roots = Some(roots.clone());

                let mut commands = vec![Command::StoreRoots(roots)];
                commands.extend(issue_current_listing(ctx));
                commands
            }

            Route::Undecided if roots.unresolved == ctx.state.ui.address_input.trim() => {
                info!(marker = "ADDRESS_AVAILABLE", "Opening resolved tree");
                ctx.state.route = Route::Tree {
                    address: roots.unresolved.clone(),
                    path_segments: Default::default(),
                };
                ctx.state.roots = Some(roots.clone());

                let mut commands = vec![Command::StoreRoots(roots)];
                commands.extend(issue_current_listing(ctx));
                commands
            }

            _ => {
                debug!(marker = "ADDRESS_STALE", "Resolution no longer wanted");
                Vec::new()
            }
        }
    }

    fn resolve_failed(ctx: &mut DispatchContext<'_>, message: CompactString) -> Vec<Command> {
        let awaiting_root = matches!(ctx.state.route, Route::Tree { .. })
            && ctx.state.active_roots().is_none()
            && ctx.state.status == BackendStatus::InitialListing;

        if awaiting_root {
            ctx.stop_loading();
            ctx.state.status.fail(message);
            return Vec::new();
        }

        vec![ctx.warning(format!("Could not resolve address: {message}"))]
    }
}

impl ActionMatcher for AddressDispatcher {
    fn can_handle(&self, action: &Action) -> bool {
        matches!(
            action,
            Action::GotAddressInput(_)
                | Action::SubmitAddress
                | Action::GotResolvedAddress(_)
                | Action::GotResolveError(_)
        )
    }

    fn priority(&self) -> ActionPriority {
        ActionPriority::Normal
    }

    fn name(&self) -> &'static str {
        "address"
    }
}

impl ActionHandler for AddressDispatcher {
    fn handle(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        action: Action,
    ) -> Result<DispatchResult, AppError> {
        let commands = match action {
            Action::GotAddressInput(input) => {
                ctx.state.ui.set_address_input(input);
                Vec::new()
            }
            Action::SubmitAddress => Self::submit(ctx),
            Action::GotResolvedAddress(roots) => Self::resolved(ctx, roots),
            Action::GotResolveError(message) => Self::resolve_failed(ctx, message),
            _ => return Ok(DispatchResult::NotHandled),
        };

        Ok(DispatchResult::Continue(commands))
    }
}
