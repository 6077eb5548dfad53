//! ActionDispatcher: modular action processing.
//!
//! Every action is applied to the owned [`AppState`] by exactly one handler,
//! one action at a time. Handlers never perform I/O themselves; they return
//! [`Command`]s which the event loop executes and whose outcomes come back as
//! new actions.
//!
//! Two actions are handled here rather than by a handler because they wrap
//! other actions:
//! - `Debounce { concern, action }` applies `action` and restarts the quiet
//!   period of `concern`.
//! - `DebounceSettled { .. }` turns a settled concern into its follow-up
//!   action.

use compact_str::CompactString;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::DebounceConfig;
use crate::controller::actions::{Action, Command};
use crate::error::AppError;
use crate::model::{
    app_state::{AppState, debounce_registry},
    ui_state::{Notification, NotificationLevel},
};
use crate::util::debounce::{DebounceConcern, DebounceRegistry};

pub mod address_dispatcher;
pub mod fs_dispatcher;
pub mod listing_dispatcher;
pub mod ui_dispatcher;

use address_dispatcher::AddressDispatcher;
use fs_dispatcher::FileOpsDispatcher;
use listing_dispatcher::ListingDispatcher;
use ui_dispatcher::UIControlDispatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Keep running; execute these commands.
    Continue(Vec<Command>),
    NotHandled,
    Terminate,
}

impl DispatchResult {
    #[must_use]
    pub const fn done() -> Self {
        Self::Continue(Vec::new())
    }

    /// Commands to run, empty for the other variants.
    #[must_use]
    pub fn into_commands(self) -> Vec<Command> {
        match self {
            Self::Continue(commands) => commands,
            Self::NotHandled | Self::Terminate => Vec::new(),
        }
    }
}

/// Handlers are consulted in ascending priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionPriority {
    Critical = 0,
    High = 1,
    Normal = 2,
    Low = 3,
}

pub trait ActionMatcher {
    fn can_handle(&self, action: &Action) -> bool;
    fn priority(&self) -> ActionPriority;
    fn name(&self) -> &'static str;
}

pub trait ActionHandler: ActionMatcher + Send {
    fn handle(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        action: Action,
    ) -> Result<DispatchResult, AppError>;
}

/// What a handler gets to work with for one action.
pub struct DispatchContext<'a> {
    pub state: &'a mut AppState,
    pub debounce: &'a DebounceRegistry<AppState>,
}

impl DispatchContext<'_> {
    /// Restart `concern`'s quiet period.
    pub fn debounce(&mut self, concern: DebounceConcern) -> Command {
        Command::ScheduleSettle(self.debounce.provide_input(self.state, concern))
    }

    pub fn cancel(&mut self, concern: DebounceConcern) {
        self.debounce.cancel(self.state, concern);
    }

    /// Hide the loading overlay and drop its pending settle.
    pub fn stop_loading(&mut self) {
        self.state.ui.show_loading_overlay = false;
        self.cancel(DebounceConcern::LoadingOverlay);
    }

    /// Show a notification that dismisses itself once things are quiet.
    pub fn notify(&mut self, notification: Notification) -> Command {
        debug!(
            marker = "NOTIFICATION",
            level = %notification.level,
            message = %notification.message,
            "Notification shown"
        );
        self.state.ui.push_notification(notification);
        self.debounce(DebounceConcern::Notification)
    }

    pub fn success(&mut self, message: impl Into<CompactString>) -> Command {
        self.notify(Notification::new(message, NotificationLevel::Success))
    }

    pub fn warning(&mut self, message: impl Into<CompactString>) -> Command {
        self.notify(Notification::new(message, NotificationLevel::Warning))
    }

    pub fn error(&mut self, message: impl Into<CompactString>) -> Command {
        self.notify(Notification::new(message, NotificationLevel::Error))
    }
}

pub struct ModularActionDispatcher {
    handlers: Vec<Box<dyn ActionHandler>>,
    debounce: DebounceRegistry<AppState>,
}

impl ModularActionDispatcher {
    #[must_use]
    pub fn new(config: &DebounceConfig) -> Self {
        let mut handlers: Vec<Box<dyn ActionHandler>> = vec![
            Box::new(ListingDispatcher::new()),
            Box::new(AddressDispatcher::new()),
            Box::new(FileOpsDispatcher::new()),
            Box::new(UIControlDispatcher::new()),
        ];
        handlers.sort_by_key(|handler| handler.priority());

        Self {
            handlers,
            debounce: debounce_registry(config),
        }
    }

    #[must_use]
    pub const fn debounce(&self) -> &DebounceRegistry<AppState> {
        &self.debounce
    }

    /// Apply one action. Handler errors become notifications, never failures.
    #[instrument(level = "trace", skip_all, fields(action = action.name()))]
    pub fn dispatch(&mut self, state: &mut AppState, action: Action) -> DispatchResult {
        match action {
            Action::Quit => {
                info!(marker = "QUIT", "Quit requested");
                DispatchResult::Terminate
            }

            Action::Debounce { concern, action } => {
                let result = self.dispatch(state, *action);
                let timer = self.debounce.provide_input(state, concern);

                match result {
                    DispatchResult::Continue(mut commands) => {
                        commands.push(Command::ScheduleSettle(timer));
                        DispatchResult::Continue(commands)
                    }
                    DispatchResult::NotHandled => {
                        DispatchResult::Continue(vec![Command::ScheduleSettle(timer)])
                    }
                    DispatchResult::Terminate => DispatchResult::Terminate,
                }
            }

            Action::DebounceSettled {
                concern,
                generation,
            } => {
                if !self.debounce.settle(state, concern, generation) {
                    return DispatchResult::done();
                }

                debug!(marker = "DEBOUNCE_SETTLED", concern = %concern, "Quiet period elapsed");
                self.dispatch(state, settle_action(concern))
            }

            action => self.dispatch_to_handler(state, action),
        }
    }

    fn dispatch_to_handler(&mut self, state: &mut AppState, action: Action) -> DispatchResult {
        let Some(handler) = self.handlers.iter_mut().find(|h| h.can_handle(&action)) else {
            warn!(marker = "ACTION_UNHANDLED", action = action.name(), "No handler for action");
            return DispatchResult::NotHandled;
        };

        trace!(handler = handler.name(), action = action.name(), "Dispatching");

        let mut ctx = DispatchContext {
            state,
            debounce: &self.debounce,
        };

        match handler.handle(&mut ctx, action) {
            Ok(result) => result,
            Err(e @ AppError::InvalidInput { .. }) => {
                info!(
                    marker = "ACTION_REJECTED",
                    handler = handler.name(),
                    error = %e,
                    "Rejected input"
                );
                DispatchResult::Continue(vec![ctx.warning(e.to_string())])
            }
            Err(e) => {
                warn!(
                    marker = "ACTION_FAILED",
                    handler = handler.name(),
                    error = %e,
                    "Handler failed"
                );
                DispatchResult::Continue(vec![ctx.error(e.to_string())])
            }
        }
    }
}

/// Follow-up of a settled concern.
const fn settle_action(concern: DebounceConcern) -> Action {
    match concern {
        DebounceConcern::LoadingOverlay => Action::ShowLoadingOverlay,
        DebounceConcern::Notification => Action::DismissNotifications,
        DebounceConcern::AddressCheck => Action::SubmitAddress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        listing::{ListingMode, ListingRequestContext},
        route::{Roots, Route, path_segments},
        status::{BackendStatus, OperationKind},
    };
    use crate::util::debounce::SettleTimer;
    use serde_json::{Value, json};

    fn dispatcher() -> ModularActionDispatcher {
        ModularActionDispatcher::new(&DebounceConfig::default())
    }

    fn run(d: &mut ModularActionDispatcher, state: &mut AppState, action: Action) -> Vec<Command> {
        d.dispatch(state, action).into_commands()
    }

    fn timers(commands: &[Command]) -> Vec<SettleTimer> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::ScheduleSettle(timer) => Some(*timer),
                _ => None,
            })
            .collect()
    }

    fn settle(
        d: &mut ModularActionDispatcher,
        state: &mut AppState,
        timer: SettleTimer,
    ) -> Vec<Command> {
        run(
            d,
            state,
            Action::DebounceSettled {
                concern: timer.concern,
                generation: timer.generation,
            },
        )
    }

    fn drive_payload(segments: &[&str], entries: Value) -> Action {
        Action::drive_listing(json!({ "pathSegments": segments, "results": entries }))
    }

    fn names(state: &AppState) -> Vec<String> {
        state
            .listing
            .as_ref()
            .map(|l| l.items.iter().map(|i| i.name.to_string()).collect())
            .unwrap_or_default()
    }

    fn loaded_drive(d: &mut ModularActionDispatcher, path: &[&str]) -> AppState {
        let mut state = AppState::default();
        run(d, &mut state, Action::Navigate(Route::drive(path.iter().copied())));
        run(
            d,
            &mut state,
            drive_payload(path, json!([{ "name": "seed.txt", "isFile": true }])),
        );
        assert!(state.status.is_ready());
        state
    }

    #[test]
    fn test_navigate_issues_initial_listing_and_loading_timer() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        let commands = run(&mut d, &mut state, Action::Navigate(Route::drive(["a"])));

        assert_eq!(
            commands[0],
            Command::RequestListing(ListingRequestContext {
                path_segments: path_segments(["a"]),
                mode: ListingMode::Initial,
            })
        );
        assert_eq!(timers(&commands)[0].concern, DebounceConcern::LoadingOverlay);
        assert_eq!(state.status, BackendStatus::InitialListing);
    }

    #[test]
    fn test_listing_is_sorted_folders_first() {
        let mut d = dispatcher();
        let mut state = AppState::default();
        run(&mut d, &mut state, Action::Navigate(Route::drive(Vec::<&str>::new())));

        let commands = run(
            &mut d,
            &mut state,
            drive_payload(
                &[],
                json!([
                    { "name": "zeta.txt", "isFile": true },
                    { "name": "Beta", "isFile": false },
                    { "name": "alpha.md", "isFile": true },
                    { "name": "public", "isFile": false },
                    { "name": "apps", "isFile": false }
                ]),
            ),
        );

        assert_eq!(names(&state), ["public", "apps", "Beta", "alpha.md", "zeta.txt"]);
        assert_eq!(state.floor, 1);
        assert!(state.status.is_ready());
        assert!(commands.contains(&Command::ScrollToTop));
    }

    #[test]
    fn test_stale_additional_response_is_discarded() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &[]);

        run(&mut d, &mut state, Action::Navigate(Route::drive(["a"])));
        run(&mut d, &mut state, Action::Navigate(Route::drive(["b"])));
        assert_eq!(state.status, BackendStatus::AdditionalListing);

        let commands = run(
            &mut d,
            &mut state,
            drive_payload(&["a"], json!([{ "name": "from-a.txt" }])),
        );
        assert!(commands.is_empty());
        assert_eq!(names(&state), ["seed.txt"]);

        run(&mut d, &mut state, drive_payload(&["b"], json!([{ "name": "from-b.txt" }])));
        assert_eq!(names(&state), ["from-b.txt"]);
        assert_eq!(state.floor, 2);
        assert!(state.status.is_ready());
    }

    #[test]
    fn test_initial_response_wins_even_after_route_change() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        run(&mut d, &mut state, Action::Navigate(Route::drive(["a"])));
        run(&mut d, &mut state, Action::Navigate(Route::drive(["b"])));
        assert_eq!(state.status, BackendStatus::InitialListing);

        run(&mut d, &mut state, drive_payload(&["a"], json!([{ "name": "from-a.txt" }])));
        assert_eq!(names(&state), ["from-a.txt"]);
        assert!(state.status.is_ready());

        run(&mut d, &mut state, drive_payload(&["b"], json!([{ "name": "from-b.txt" }])));
        assert_eq!(names(&state), ["from-b.txt"]);
    }

    #[test]
    fn test_deep_link_selects_single_file() {
        let mut d = dispatcher();
        let mut state = AppState::default();
        run(
            &mut d,
            &mut state,
            Action::Navigate(Route::drive(["docs", "report.pdf"])),
        );
        run(
            &mut d,
            &mut state,
            drive_payload(
                &["docs", "report.pdf"],
                json!([{ "name": "report.pdf", "path": "docs/report.pdf", "isFile": true }]),
            ),
        );

        assert_eq!(state.selected_path, Some(path_segments(["docs", "report.pdf"])));
        assert!(state.ui.expand_sidebar);
    }

    #[test]
    fn test_malformed_results_on_additional_keep_previous_listing() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &[]);

        run(&mut d, &mut state, Action::Refresh);
        run(
            &mut d,
            &mut state,
            Action::drive_listing(json!({ "pathSegments": [], "results": 42 })),
        );

        assert!(state.status.is_error());
        assert_eq!(names(&state), ["seed.txt"]);
    }

    #[test]
    fn test_malformed_results_on_initial_leave_empty_default() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        run(&mut d, &mut state, Action::Navigate(Route::drive(["a"])));
        run(
            &mut d,
            &mut state,
            Action::drive_listing(json!({ "pathSegments": ["a"], "results": "oops" })),
        );

        assert!(state.status.is_error());
        assert_eq!(state.item_count(), 0);
        assert!(state.listing.is_ok());
    }

    #[test]
    fn test_backend_error_payload_replaces_listing() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &["a"]);

        run(&mut d, &mut state, Action::Refresh);
        run(
            &mut d,
            &mut state,
            Action::drive_listing(json!({ "pathSegments": ["a"], "error": "gone" })),
        );

        assert_eq!(state.listing_error().map(CompactString::as_str), Some("gone"));
        assert_eq!(state.status, BackendStatus::Error("gone".into()));
    }

    #[test]
    fn test_error_recovers_with_next_listing() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &["a"]);

        run(&mut d, &mut state, Action::Refresh);
        run(&mut d, &mut state, Action::GotListingError("timeout".into()));
        assert!(state.status.is_error());
        assert_eq!(names(&state), ["seed.txt"]);

        let commands = run(&mut d, &mut state, Action::Retry);
        assert!(matches!(
            &commands[0],
            Command::RequestListing(ListingRequestContext { mode: ListingMode::Initial, .. })
        ));
        run(&mut d, &mut state, drive_payload(&["a"], json!([{ "name": "fresh.txt" }])));
        assert!(state.status.is_ready());
        assert_eq!(names(&state), ["fresh.txt"]);
    }

    #[test]
    fn test_loading_overlay_only_after_quiet_period() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        let first = timers(&run(&mut d, &mut state, Action::Navigate(Route::drive(["a"]))))[0];
        let second = timers(&run(&mut d, &mut state, Action::Navigate(Route::drive(["b"]))))[0];

        settle(&mut d, &mut state, first);
        assert!(!state.ui.show_loading_overlay);

        settle(&mut d, &mut state, second);
        assert!(state.ui.show_loading_overlay);

        run(&mut d, &mut state, drive_payload(&["b"], json!([])));
        assert!(!state.ui.show_loading_overlay);
    }

    #[test]
    fn test_accepted_listing_suppresses_overlay() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        let timer = timers(&run(&mut d, &mut state, Action::Navigate(Route::drive(["a"]))))[0];
        run(&mut d, &mut state, drive_payload(&["a"], json!([])));
        settle(&mut d, &mut state, timer);

        assert!(!state.ui.show_loading_overlay);
    }

    #[test]
    fn test_debounce_wrapper_applies_immediately() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        let commands = run(&mut d, &mut state, Action::type_address("docs.example"));
        assert_eq!(state.ui.address_input, "docs.example");
        assert_eq!(timers(&commands)[0].concern, DebounceConcern::AddressCheck);
        assert!(!commands.iter().any(|c| matches!(c, Command::ResolveAddress(_))));
    }

    #[test]
    fn test_address_check_settles_into_resolution() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        let first = timers(&run(&mut d, &mut state, Action::type_address("docs")))[0];
        let second = timers(&run(&mut d, &mut state, Action::type_address("docs.example")))[0];

        assert!(settle(&mut d, &mut state, first).is_empty());
        assert_eq!(
            settle(&mut d, &mut state, second),
            vec![Command::ResolveAddress("docs.example".into())]
        );
    }

    #[test]
    fn test_notifications_dismiss_after_quiet_period() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        let commands = run(
            &mut d,
            &mut state,
            Action::ShowNotification(Notification::new("hello", NotificationLevel::Info)),
        );
        assert_eq!(state.ui.notifications.len(), 1);

        settle(&mut d, &mut state, timers(&commands)[0]);
        assert!(state.ui.notifications.is_empty());
    }

    #[test]
    fn test_resolved_address_lists_tree() {
        let mut d = dispatcher();
        let mut state = AppState::default();

        let commands = run(
            &mut d,
            &mut state,
            Action::Navigate(Route::tree("docs.example", ["guides"])),
        );
        assert!(commands.contains(&Command::ResolveAddress("docs.example".into())));
        assert_eq!(state.status, BackendStatus::InitialListing);

        let roots = Roots {
            unresolved: "docs.example".into(),
            resolved: "bafyroot".into(),
            is_dns_link: true,
        };
        let commands = run(&mut d, &mut state, Action::GotResolvedAddress(roots.clone()));
        assert!(commands.contains(&Command::StoreRoots(roots)));
        assert!(commands.contains(&Command::RequestPublicListing {
            context: ListingRequestContext {
                path_segments: path_segments(["bafyroot", "guides"]),
                mode: ListingMode::Initial,
            },
            root: "bafyroot".into(),
        }));

        run(
            &mut d,
            &mut state,
            Action::public_listing(json!({
                "pathSegments": ["bafyroot", "guides"],
                "results": [{ "name": "intro.md", "type": "file", "size": 12 }]
            })),
        );
        assert_eq!(names(&state), ["intro.md"]);
        assert_eq!(state.floor, 2);

        let item = &state.listing.as_ref().unwrap().items[0];
        assert_eq!(item.path.as_slice(), ["guides", "intro.md"]);
    }

    #[test]
    fn test_late_tree_listing_after_switch_to_drive_is_discarded() {
        let mut d = dispatcher();
        let mut state = AppState::default();
        state.roots = Some(Roots {
            unresolved: "docs.example".into(),
            resolved: "bafyroot".into(),
            is_dns_link: false,
        });

        let commands = run(
            &mut d,
            &mut state,
            Action::Navigate(Route::tree("docs.example", Vec::<&str>::new())),
        );
        assert!(matches!(commands[0], Command::RequestPublicListing { .. }));

        run(&mut d, &mut state, Action::Navigate(Route::drive(Vec::<&str>::new())));
        assert_eq!(state.status, BackendStatus::InitialListing);

        let commands = run(
            &mut d,
            &mut state,
            Action::public_listing(json!({
                "pathSegments": ["bafyroot"],
                "results": [{ "name": "intro.md", "type": "file" }]
            })),
        );
        assert!(commands.is_empty());
        assert_eq!(state.status, BackendStatus::InitialListing);
        assert_eq!(state.item_count(), 0);

        run(&mut d, &mut state, drive_payload(&[], json!([{ "name": "mine.txt" }])));
        assert_eq!(names(&state), ["mine.txt"]);
        assert_eq!(state.floor, 1);
        assert!(state.status.is_ready());
    }

    #[test]
    fn test_explore_screen_forgets_roots() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &["a"]);
        state.roots = Some(Roots {
            unresolved: "x".into(),
            resolved: "y".into(),
            is_dns_link: false,
        });

        let commands = run(&mut d, &mut state, Action::Navigate(Route::Undecided));

        assert_eq!(commands, vec![Command::RemoveStoredRoots]);
        assert_eq!(state.roots, None);
        assert_eq!(state.status, BackendStatus::NotNeeded);
        assert_eq!(state.item_count(), 0);
    }

    #[test]
    fn test_mutations_are_gated_on_ready() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &["a"]);

        let commands = run(
            &mut d,
            &mut state,
            Action::CreateDirectory { name: "new".into() },
        );
        assert_eq!(commands, vec![Command::CreateDirectory { path: path_segments(["a", "new"]) }]);

        let commands = run(
            &mut d,
            &mut state,
            Action::RemoveItem { path: path_segments(["a", "seed.txt"]) },
        );
        assert!(commands.is_empty());
        assert_eq!(state.status.to_string(), "running create directory");
    }

    #[test]
    fn test_operation_success_refreshes_listing() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &["a"]);

        run(&mut d, &mut state, Action::CreateDirectory { name: "new".into() });
        let commands = run(&mut d, &mut state, Action::OperationFinished(Ok(())));

        assert!(commands.contains(&Command::RequestListing(ListingRequestContext {
            path_segments: path_segments(["a"]),
            mode: ListingMode::Additional,
        })));
        assert_eq!(state.status, BackendStatus::AdditionalListing);
        assert_eq!(
            state.ui.latest_notification().map(|n| n.level),
            Some(NotificationLevel::Success)
        );
    }

    #[test]
    fn test_operation_survives_navigation() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &["a"]);

        run(&mut d, &mut state, Action::CreateDirectory { name: "new".into() });
        run(&mut d, &mut state, Action::Navigate(Route::drive(["b"])));
        assert_eq!(state.status, BackendStatus::AdditionalListing);

        run(&mut d, &mut state, drive_payload(&["b"], json!([{ "name": "seed.txt" }])));
        assert_eq!(names(&state), ["seed.txt"]);
        assert_eq!(
            state.status,
            BackendStatus::Operation(OperationKind::CreatingDirectory)
        );

        let commands = run(
            &mut d,
            &mut state,
            Action::RenameItem {
                path: path_segments(["b", "seed.txt"]),
                new_name: "renamed.txt".into(),
            },
        );
        assert!(commands.is_empty());
        assert!(run(&mut d, &mut state, Action::Refresh).is_empty());

        let commands = run(&mut d, &mut state, Action::OperationFinished(Ok(())));
        assert_eq!(
            state.ui.latest_notification().map(|n| n.message.as_str()),
            Some("Directory created")
        );
        assert!(commands.contains(&Command::RequestListing(ListingRequestContext {
            path_segments: path_segments(["b"]),
            mode: ListingMode::Additional,
        })));
        assert_eq!(state.operation, None);
    }

    #[test]
    fn test_invalid_name_becomes_warning() {
        let mut d = dispatcher();
        let mut state = loaded_drive(&mut d, &["a"]);

        let commands = run(
            &mut d,
            &mut state,
            Action::CreateDirectory { name: "a/b".into() },
        );

        assert_eq!(timers(&commands)[0].concern, DebounceConcern::Notification);
        assert_eq!(
            state.ui.latest_notification().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
        assert!(state.status.is_ready());
    }

    #[test]
    fn test_quit_terminates() {
        let mut d = dispatcher();
        let mut state = AppState::default();
        assert_eq!(d.dispatch(&mut state, Action::Quit), DispatchResult::Terminate);
    }
}
