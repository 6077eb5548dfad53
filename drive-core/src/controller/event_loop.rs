//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop
//!
//! Owns the [`AppState`] and applies one action at a time through the
//! [`ModularActionDispatcher`]. Commands returned by the dispatcher are run as
//! spawned tasks against the [`DriveBackend`]; their outcomes re-enter the
//! loop as actions on the same channel. Debounce timers are plain sleeping
//! tasks reporting their generation back. Writes to the stored roots go
//! through a single writer task so they land in the order they were issued.
//!
//! After every action a [`DirectorySnapshot`] is published on a watch channel.
//! The loop ends on [`Action::Quit`] or when its cancellation token fires.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::DebounceConfig;
use crate::controller::action_dispatcher::{DispatchResult, ModularActionDispatcher};
use crate::controller::actions::{Action, Command};
use crate::controller::traits::DriveBackend;
use crate::model::{app_state::AppState, route::Roots};
use crate::util::debounce::SettleTimer;
use crate::view::snapshots::DirectorySnapshot;

#[derive(Debug)]
enum RootsWrite {
    Store(Roots),
    Remove,
}

pub struct EventLoop {
    state: AppState,
    dispatcher: ModularActionDispatcher,
    backend: Arc<dyn DriveBackend>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    snapshot_tx: watch::Sender<DirectorySnapshot>,
    roots_tx: mpsc::UnboundedSender<RootsWrite>,
    roots_rx: Option<mpsc::UnboundedReceiver<RootsWrite>>,
    cancel: CancellationToken,
    scroll_requests: u64,
    action_count: u64,
}

impl EventLoop {
    pub fn new(state: AppState, debounce: &DebounceConfig, backend: Arc<dyn DriveBackend>) -> Self {
        info!(backend = backend.name(), "Initializing event loop");

        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(DirectorySnapshot::capture(&state, 0));
        let (roots_tx, roots_rx) = mpsc::unbounded_channel();

        Self {
            state,
            dispatcher: ModularActionDispatcher::new(debounce),
            backend,
            action_tx,
            action_rx,
            snapshot_tx,
            roots_tx,
            roots_rx: Some(roots_rx),
            cancel: CancellationToken::new(),
            scroll_requests: 0,
            action_count: 0,
        }
    }

    /// Feed actions into the loop from anywhere.
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DirectorySnapshot> {
        self.snapshot_tx.subscribe()
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Runs until quit or cancellation and hands the final state back once
    /// pending roots writes are done.
    pub async fn run(mut self) -> anyhow::Result<AppState> {
        info!(marker = "EVENT_LOOP_START", "Event loop started");

        let writer = self
            .roots_rx
            .take()
            .map(|rx| tokio::spawn(write_roots(Arc::clone(&self.backend), rx)));

        while let Some(action) = self.next_action().await {
            if !self.process(action) {
                break;
            }
        }

        info!(
            marker = "EVENT_LOOP_STOP",
            actions = self.action_count,
            "Event loop stopped"
        );

        let Self { state, roots_tx, .. } = self;
        drop(roots_tx);

        if let Some(writer) = writer {
            writer.await.context("Roots writer failed")?;
        }

        Ok(state)
    }

    pub async fn next_action(&mut self) -> Option<Action> {
        tokio::select! {
            biased;

            () = self.cancel.cancelled() => {
                info!("Event loop cancelled");
                None
            }

            action = self.action_rx.recv() => action,
        }
    }

    /// Applies one action. Returns `false` when the loop should stop.
    pub fn process(&mut self, action: Action) -> bool {
        self.action_count += 1;
        trace!(action = action.name(), "Processing action");

        let commands = match self.dispatcher.dispatch(&mut self.state, action) {
            DispatchResult::Terminate => return false,
            DispatchResult::NotHandled => Vec::new(),
            DispatchResult::Continue(commands) => commands,
        };

        for command in commands {
            self.execute(command);
        }

        self.snapshot_tx
            .send_replace(DirectorySnapshot::capture(&self.state, self.scroll_requests));
        true
    }

    fn execute(&mut self, command: Command) {
        debug!(command = command.name(), "Executing command");
        let backend = Arc::clone(&self.backend);

        match command {
            Command::RequestListing(context) => self.spawn_task(async move {
                match backend.list_directory(&context.path_segments).await {
                    Ok(payload) => Action::drive_listing(payload),
                    Err(e) => Action::GotListingError(e.to_string().into()),
                }
            }),

            Command::RequestPublicListing { context, root } => self.spawn_task(async move {
                match backend
                    .list_public_directory(&context.path_segments, &root)
                    .await
                {
                    Ok(payload) => Action::public_listing(payload),
                    Err(e) => Action::GotListingError(e.to_string().into()),
                }
            }),

            Command::ResolveAddress(input) => self.spawn_task(async move {
                match backend.resolve_address(&input).await {
                    Ok(roots) => Action::GotResolvedAddress(roots),
                    Err(e) => Action::GotResolveError(e.to_string().into()),
                }
            }),

            Command::StoreRoots(roots) => self.queue_roots_write(RootsWrite::Store(roots)),

            Command::RemoveStoredRoots => self.queue_roots_write(RootsWrite::Remove),

            Command::CreateDirectory { path } => self.spawn_task(async move {
                let outcome = backend.create_directory(&path).await;
                Action::OperationFinished(outcome.map_err(|e| e.to_string().into()))
            }),

            Command::Rename { path, new_name } => self.spawn_task(async move {
                let outcome = backend.rename(&path, &new_name).await;
                Action::OperationFinished(outcome.map_err(|e| e.to_string().into()))
            }),

            Command::Remove { path } => self.spawn_task(async move {
                let outcome = backend.remove(&path).await;
                Action::OperationFinished(outcome.map_err(|e| e.to_string().into()))
            }),

            Command::ScheduleSettle(timer) => self.schedule_settle(timer),

            Command::ScrollToTop => {
                self.scroll_requests += 1;
                trace!(marker = "SCROLL_TO_TOP", "Scroll to top requested");
            }
        }
    }

    /// Run `task` and feed its resulting action back into the loop.
    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let action = task.await;
            if tx.send(action).is_err() {
                debug!("Event loop gone, dropping task result");
            }
        });
    }

    fn queue_roots_write(&self, write: RootsWrite) {
        if self.roots_tx.send(write).is_err() {
            warn!(marker = "ROOTS_WRITE_DROPPED", "Roots writer gone, dropping write");
        }
    }

    fn schedule_settle(&self, timer: SettleTimer) {
        let tx = self.action_tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(timer.after) => {
                    let settled = Action::DebounceSettled {
                        concern: timer.concern,
                        generation: timer.generation,
                    };
                    if tx.send(settled).is_err() {
                        debug!("Event loop gone, dropping settle timer");
                    }
                }
            }
        });
    }
}

/// Applies roots writes one at a time until every sender is gone.
async fn write_roots(
    backend: Arc<dyn DriveBackend>,
    mut rx: mpsc::UnboundedReceiver<RootsWrite>,
) {
    while let Some(write) = rx.recv().await {
        let outcome = match &write {
            RootsWrite::Store(roots) => backend.store_roots(roots).await,
            RootsWrite::Remove => backend.remove_stored_roots().await,
        };

        if let Err(e) = outcome {
            warn!(
                marker = "ROOTS_WRITE_FAILED",
                write = ?write,
                error = %e,
                "Could not update stored roots"
            );
        }
    }

    debug!("Roots writer finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::model::{
        route::{Roots, Route},
        status::BackendStatus,
    };
    use async_trait::async_trait;
    use compact_str::CompactString;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Lists every directory with one file named after the last segment.
    /// Roots writes are recorded; removal is slow.
    #[derive(Default)]
    struct EchoBackend {
        roots_writes: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl DriveBackend for EchoBackend {
        async fn list_directory(&self, path_segments: &[CompactString]) -> Result<Value, AppError> {
            let name = path_segments.last().map_or("root", CompactString::as_str);
            Ok(json!({
                "pathSegments": path_segments,
                "results": [{ "name": format!("{name}.txt"), "isFile": true, "size": 3 }]
            }))
        }

        async fn list_public_directory(
            &self,
            path_segments: &[CompactString],
            _root: &str,
        ) -> Result<Value, AppError> {
            Ok(json!({ "pathSegments": path_segments, "results": [] }))
        }

        async fn resolve_address(&self, input: &str) -> Result<Roots, AppError> {
            Err(AppError::unresolved(input, "no public trees here"))
        }

        async fn store_roots(&self, _roots: &Roots) -> Result<(), AppError> {
            self.roots_writes.lock().unwrap().push("store");
            Ok(())
        }

        async fn remove_stored_roots(&self) -> Result<(), AppError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.roots_writes.lock().unwrap().push("remove");
            Ok(())
        }

        async fn stored_roots(&self) -> Result<Option<Roots>, AppError> {
            Ok(None)
        }

        async fn create_directory(&self, _path: &[CompactString]) -> Result<(), AppError> {
            Ok(())
        }

        async fn rename(&self, _path: &[CompactString], _new_name: &str) -> Result<(), AppError> {
            Ok(())
        }

        async fn remove(&self, path: &[CompactString]) -> Result<(), AppError> {
            Err(AppError::operation_failed("remove", path.join("/"), "read-only"))
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    fn event_loop_with(backend: Arc<EchoBackend>) -> EventLoop {
        let debounce = DebounceConfig {
            loading_overlay: Duration::from_millis(20),
            notification: Duration::from_millis(20),
            address_check: Duration::from_millis(20),
        };
        EventLoop::new(AppState::default(), &debounce, backend)
    }

    fn event_loop() -> EventLoop {
        event_loop_with(Arc::new(EchoBackend::default()))
    }

    async fn wait_until(
        rx: &mut watch::Receiver<DirectorySnapshot>,
        f: impl FnMut(&DirectorySnapshot) -> bool,
    ) -> DirectorySnapshot {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(f))
            .await
            .expect("timed out waiting for snapshot")
            .expect("event loop dropped")
            .clone()
    }

    #[tokio::test]
    async fn test_navigation_lists_directory() {
        let event_loop = event_loop();
        let tx = event_loop.sender();
        let mut rx = event_loop.subscribe();
        let handle = tokio::spawn(event_loop.run());

        tx.send(Action::Navigate(Route::drive(["docs"]))).unwrap();
        let snapshot = wait_until(&mut rx, DirectorySnapshot::is_final).await;

        assert_eq!(snapshot.status, BackendStatus::Ready);
        assert_eq!(snapshot.items()[0].name, "docs.txt");
        assert_eq!(snapshot.floor, 2);
        assert_eq!(snapshot.scroll_requests, 1);

        tx.send(Action::Quit).unwrap();
        let state = handle.await.unwrap().unwrap();
        assert_eq!(state.route, Route::drive(["docs"]));
    }

    #[tokio::test]
    async fn test_failed_resolution_sets_error() {
        let event_loop = event_loop();
        let tx = event_loop.sender();
        let mut rx = event_loop.subscribe();
        let cancel = event_loop.cancellation_token();
        let handle = tokio::spawn(event_loop.run());

        tx.send(Action::Navigate(Route::tree("nowhere.example", Vec::<&str>::new())))
            .unwrap();
        let snapshot = wait_until(&mut rx, DirectorySnapshot::is_final).await;
        assert!(snapshot.status.is_error());

        cancel.cancel();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_failed_operation_notifies_and_dismisses() {
        let event_loop = event_loop();
        let tx = event_loop.sender();
        let mut rx = event_loop.subscribe();
        let handle = tokio::spawn(event_loop.run());

        tx.send(Action::Navigate(Route::drive(["a"]))).unwrap();
        wait_until(&mut rx, DirectorySnapshot::is_final).await;

        tx.send(Action::RemoveItem {
            path: crate::model::route::path_segments(["a", "a.txt"]),
        })
        .unwrap();
        let snapshot = wait_until(&mut rx, |s| s.notification.is_some()).await;
        assert!(snapshot.status.is_ready());

        let snapshot = wait_until(&mut rx, |s| s.notification.is_none()).await;
        assert!(snapshot.status.is_ready());

        tx.send(Action::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_roots_writes_keep_issue_order() {
        let backend = Arc::new(EchoBackend::default());
        let event_loop = event_loop_with(Arc::clone(&backend));
        let tx = event_loop.sender();
        let handle = tokio::spawn(event_loop.run());

        tx.send(Action::Navigate(Route::Undecided)).unwrap();
        tx.send(Action::GotAddressInput("docs.example".into())).unwrap();
        tx.send(Action::GotResolvedAddress(Roots {
            unresolved: "docs.example".into(),
            resolved: "bafyroot".into(),
            is_dns_link: false,
        }))
        .unwrap();
        tx.send(Action::Quit).unwrap();

        let state = handle.await.unwrap().unwrap();
        assert_eq!(state.route, Route::tree("docs.example", Vec::<&str>::new()));
        assert_eq!(*backend.roots_writes.lock().unwrap(), ["remove", "store"]);
    }
}
