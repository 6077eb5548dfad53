//! action_dispatcher/ui_dispatcher.rs
//! Selection, sidebar, notifications and the loading overlay

use tracing::{debug, trace};

use super::{ActionHandler, ActionMatcher, ActionPriority, DispatchContext, DispatchResult};
use crate::controller::actions::{Action, Command};
use crate::error::AppError;
use crate::model::route::PathSegments;

/// UI control dispatcher for view-only state
#[derive(Debug, Clone, Default)]
pub struct UIControlDispatcher;

impl UIControlDispatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Select an item of the shown listing. Unknown paths are ignored.
    fn select(ctx: &mut DispatchContext<'_>, path: PathSegments) {
        let known = ctx
            .state
            .listing
            .as_ref()
            .is_ok_and(|listing| listing.items.iter().any(|item| item.path == path));

        if !known {
            debug!(marker = "SELECT_IGNORED", path = %path.join("/"), "Not in the current listing");
            return;
        }

        ctx.state.selected_path = Some(path);
        ctx.state.ui.expand_sidebar = true;
    }

    fn deselect(ctx: &mut DispatchContext<'_>) {
        ctx.state.selected_path = None;
        ctx.state.ui.expand_sidebar = false;
    }

    /// Only shown while a listing is still outstanding.
    fn show_loading_overlay(ctx: &mut DispatchContext<'_>) {
        if ctx.state.status.is_listing() {
            debug!(
                marker = "LOADING_OVERLAY",
                status = %ctx.state.status,
                "Showing loading overlay"
            );
            ctx.state.ui.show_loading_overlay = true;
        }
    }
}

impl ActionMatcher for UIControlDispatcher {
    fn can_handle(&self, action: &Action) -> bool {
        matches!(
            action,
            Action::Select(_)
                | Action::Deselect
                | Action::ToggleSidebar
                | Action::ShowNotification(_)
                | Action::DismissNotifications
                | Action::ShowLoadingOverlay
        )
    }

    fn priority(&self) -> ActionPriority {
        ActionPriority::Low
    }

    fn name(&self) -> &'static str {
        "ui_control"
    }
}

impl ActionHandler for UIControlDispatcher {
    fn handle(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        action: Action,
    ) -> Result<DispatchResult, AppError> {
        let mut commands: Vec<Command> = Vec::new();

        match action {
            Action::Select(path) => Self::select(ctx, path),
            Action::Deselect => Self::deselect(ctx),
            Action::ToggleSidebar => {
                ctx.state.ui.expand_sidebar = !ctx.state.ui.expand_sidebar;
            }
            Action::ShowNotification(notification) => commands.push(ctx.notify(notification)),
            Action::DismissNotifications => {
                let dismissed = ctx.state.ui.dismiss_notifications();
                trace!(marker = "NOTIFICATIONS_DISMISSED", dismissed, "Notifications dismissed");
            }
            Action::ShowLoadingOverlay => Self::show_loading_overlay(ctx),
            _ => return Ok(DispatchResult::NotHandled),
        }

        Ok(DispatchResult::Continue(commands))
    }
}
