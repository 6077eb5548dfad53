//! drive-core/src/controller/action_dispatcher/fs_dispatcher.rs
//! Mutating drive operations with comprehensive tracing

use compact_str::CompactString;
use tracing::{info, instrument, warn};

use crate::controller::actions::{Action, Command};
use crate::error::AppError;
use crate::fs::utils::validate_name;
use crate::model::{
    route::{PathSegments, Route},
    status::OperationKind,
};

use super::listing_dispatcher::issue_current_listing;
use super::{ActionHandler, ActionMatcher, ActionPriority, DispatchContext, DispatchResult};

/// Dispatcher for create, rename and remove on the user's own drive.
#[derive(Clone, Debug, Default)]
pub struct FileOpsDispatcher;

impl FileOpsDispatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Current directory, when mutations are possible at all.
    fn drive_directory(ctx: &DispatchContext<'_>) -> Option<PathSegments> {
        match &ctx.state.route {
            Route::Drive { path_segments } => Some(path_segments.clone()),
            route => {
                info!(
                    marker = "OPERATION_GATED",
                    route = %route,
                    "Mutations only apply to the drive"
                );
                None
            }
        }
    }

    /// Moves the status into `kind` and hands back `command`, or nothing when
    /// another operation or a listing is still running.
    fn start(
        ctx: &mut DispatchContext<'_>,
        kind: OperationKind,
        command: Command,
    ) -> Vec<Command> {
        if let Some(running) = ctx.state.operation {
            info!(
                marker = "OPERATION_GATED",
                operation_type = %kind,
                running = %running,
                "Operation ignored while another is running"
            );
            return Vec::new();
        }

        if !ctx.state.status.begin_operation(kind) {
            return Vec::new();
        }

        ctx.state.operation = Some(kind);

        info!(marker = "OPERATION_STARTED", operation_type = %kind, "Operation started");
        vec![command]
    }

    #[instrument(level = "info", skip(ctx))]
    fn create_directory(
        ctx: &mut DispatchContext<'_>,
        name: &str,
    ) -> Result<Vec<Command>, AppError> {
        validate_name("directory_name", name)?;

        let Some(mut path) = Self::drive_directory(ctx) else {
            return Ok(Vec::new());
        };
        path.push(CompactString::new(name));

        Ok(Self::start(
            ctx,
            OperationKind::CreatingDirectory,
            Command::CreateDirectory { path },
        ))
    }

    #[instrument(level = "info", skip(ctx))]
    fn rename(
        ctx: &mut DispatchContext<'_>,
        path: PathSegments,
        new_name: CompactString,
    ) -> Result<Vec<Command>, AppError> {
        validate_name("new_name", &new_name)?;
        if path.is_empty() {
            return Err(AppError::invalid_input("path", "the drive root cannot be renamed"));
        }

        if Self::drive_directory(ctx).is_none() {
            return Ok(Vec::new());
        }

        Ok(Self::start(
            ctx,
            OperationKind::Renaming,
            Command::Rename { path, new_name },
        ))
    }

    #[instrument(level = "info", skip(ctx))]
    fn remove(ctx: &mut DispatchContext<'_>, path: PathSegments) -> Result<Vec<Command>, AppError> {
        if path.is_empty() {
            return Err(AppError::invalid_input("path", "the drive root cannot be removed"));
        }

        if Self::drive_directory(ctx).is_none() {
            return Ok(Vec::new());
        }

        Ok(Self::start(ctx, OperationKind::Removing, Command::Remove { path }))
    }

    fn finished(ctx: &mut DispatchContext<'_>, outcome: Result<(), CompactString>) -> Vec<Command> {
        let kind = ctx.state.operation.take();
        ctx.state.status.finish_operation();

        match (kind, outcome) {
            (Some(kind), Ok(())) => {
                info!(
                    marker = "OPERATION_COMPLETED",
                    operation_type = %kind,
                    "Operation completed"
                );
                let mut commands = vec![ctx.success(success_message(kind))];
                commands.extend(issue_current_listing(ctx));
                commands
            }
            (Some(kind), Err(reason)) => {
                warn!(
                    marker = "OPERATION_FAILED",
                    operation_type = %kind,
                    error = %reason,
                    "Operation failed"
                );
                vec![ctx.error(format!("Could not {kind}: {reason}"))]
            }
            (None, Ok(())) => {
                info!(marker = "OPERATION_COMPLETED", "Operation completed after navigation");
                Vec::new()
            }
            (None, Err(reason)) => vec![ctx.error(reason)],
        }
    }
}

const fn success_message(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::CreatingDirectory => "Directory created",
        OperationKind::Renaming => "Item renamed",
        OperationKind::Removing => "Item removed",
    }
}

impl ActionMatcher for FileOpsDispatcher {
    fn can_handle(&self, action: &Action) -> bool {
        matches!(
            action,
            Action::CreateDirectory { .. }
                | Action::RenameItem { .. }
                | Action::RemoveItem { .. }
                | Action::OperationFinished(_)
        )
    }

    fn priority(&self) -> ActionPriority {
        ActionPriority::Normal
    }

    fn name(&self) -> &'static str {
        "file_ops"
    }
}

impl ActionHandler for FileOpsDispatcher {
    fn handle(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        action: Action,
    ) -> Result<DispatchResult, AppError> {
        let commands = match action {
            Action::CreateDirectory { name } => Self::create_directory(ctx, &name)?,
            Action::RenameItem { path, new_name } => Self::rename(ctx, path, new_name)?,
            Action::RemoveItem { path } => Self::remove(ctx, path)?,
            Action::OperationFinished(outcome) => Self::finished(ctx, outcome),
            _ => return Ok(DispatchResult::NotHandled),
        };

        Ok(DispatchResult::Continue(commands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DebounceConfig;
    use crate::model::{
        app_state::{AppState, debounce_registry},
        route::path_segments,
        status::BackendStatus,
        ui_state::NotificationLevel,
    };

    #[test]
    fn test_mutations_ignored_outside_drive() {
        let registry = debounce_registry(&DebounceConfig::default());
        let mut state = AppState::default();
        state.route = Route::tree("docs.example", Vec::<&str>::new());
        state.status = BackendStatus::Ready;
        let mut ctx = DispatchContext {
            state: &mut state,
            debounce: &registry,
        };

        let commands = FileOpsDispatcher::remove(&mut ctx, path_segments(["a"])).unwrap();

        assert!(commands.is_empty());
        assert!(state.status.is_ready());
    }

    #[test]
    fn test_rename_and_failure() {
        let registry = debounce_registry(&DebounceConfig::default());
        let mut state = AppState::default();
        state.route = Route::drive(["a"]);
        state.status = BackendStatus::Ready;
        let mut ctx = DispatchContext {
            state: &mut state,
            debounce: &registry,
        };

        let commands =
            FileOpsDispatcher::rename(&mut ctx, path_segments(["a", "x"]), "y".into()).unwrap();
        assert_eq!(
            commands,
            vec![Command::Rename {
                path: path_segments(["a", "x"]),
                new_name: "y".into(),
            }]
        );

        let commands = FileOpsDispatcher::finished(&mut ctx, Err("permission denied".into()));
        assert_eq!(commands.len(), 1);
        assert!(state.status.is_ready());

        let note = state.ui.latest_notification().unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(note.message, "Could not rename: permission denied");
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let registry = debounce_registry(&DebounceConfig::default());
        let mut state = AppState::default();
        state.route = Route::drive(Vec::<&str>::new());
        state.status = BackendStatus::Ready;
        let mut ctx = DispatchContext {
            state: &mut state,
            debounce: &registry,
        };

        let err = FileOpsDispatcher::remove(&mut ctx, PathSegments::new()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }
}
