//! src/main.rs
//! Command line drive client: list one location and exit.
//!
//! ```text
//! drive                       explore screen
//! drive explore <address>     resolve a public address, then list it
//! drive /photos/2024          a directory of the local drive
//! drive tree:<address>/docs   a directory inside a public tree
//! ```

use std::{panic::PanicHookInfo, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use bytesize::ByteSize;
use tokio::sync::watch;
use tracing::{error, info, warn};

use drive_core::{
    config::Config,
    controller::{actions::Action, event_loop::EventLoop, traits::DriveBackend},
    logging::init_logging_with_config,
    model::{app_state::AppState, route::Route},
    operators::local_backend::LocalBackend,
    view::snapshots::DirectorySnapshot,
};

/// How long a listing may take before the client gives up.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    setup_panic_handler();

    let mut args = std::env::args().skip(1);
    let route: Route = args
        .next()
        .unwrap_or_default()
        .parse()
        .context("Invalid route")?;
    let address = args.next();

    let config = Config::load().await.unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        Config::default()
    });

    let _log_guard = init_logging_with_config(config.logging.clone())
        .await
        .context("Failed to initialize logging")?;
    info!(route = %route, "Starting drive client");

    let backend = LocalBackend::new(&config.drive);
    backend
        .ensure_layout()
        .await
        .context("Failed to prepare drive directories")?;

    let stored_roots = backend.stored_roots().await.unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable stored roots");
        None
    });

    let event_loop = EventLoop::new(
        AppState::new(stored_roots),
        &config.debounce,
        Arc::new(backend) as Arc<dyn DriveBackend>,
    );
    let tx = event_loop.sender();
    let mut snapshots = event_loop.subscribe();
    let handle = tokio::spawn(event_loop.run());

    tx.send(Action::Navigate(route.clone()))
        .context("Event loop stopped early")?;

    let waits_for_listing = match (&route, address) {
        (Route::Undecided, Some(address)) => {
            tx.send(Action::GotAddressInput(address.into()))
                .context("Event loop stopped early")?;
            tx.send(Action::SubmitAddress)
                .context("Event loop stopped early")?;
            true
        }
        (Route::Undecided, None) => false,
        _ => true,
    };

    if waits_for_listing {
        let snapshot = wait_for_final(&mut snapshots).await?;
        print_snapshot(&snapshot);
    } else {
        println!("explore: pass `explore <address>` to open a public tree");
    }

    tx.send(Action::Quit).context("Event loop stopped early")?;
    let state = handle.await.context("Event loop task failed")??;

    info!(
        route = %state.route,
        items = state.item_count(),
        "Drive client exited cleanly"
    );
    Ok(())
}

/// Waits until the shown listing is Ready or Error. An address typed on the
/// explore screen first moves the route into a tree.
async fn wait_for_final(
    snapshots: &mut watch::Receiver<DirectorySnapshot>,
) -> Result<DirectorySnapshot> {
    let snapshot = tokio::time::timeout(
        SETTLE_TIMEOUT,
        snapshots.wait_for(|s| {
            s.is_final() || (s.route == Route::Undecided && s.notification.is_some())
        }),
    )
    .await
    .context("Timed out waiting for the listing")?
    .context("Event loop stopped before the listing settled")?
    .clone();

    Ok(snapshot)
}

fn print_snapshot(snapshot: &DirectorySnapshot) {
    println!("{}  [{}]", snapshot.route, snapshot.status);

    if let Some(notification) = &snapshot.notification {
        println!("{}: {}", notification.level, notification.message);
    }

    let listing = match &snapshot.listing {
        Ok(listing) => listing,
        Err(e) => {
            println!("error: {e}");
            return;
        }
    };

    if listing.items.is_empty() {
        println!("(empty)");
        return;
    }

    for item in &listing.items {
        let marker = if snapshot.selected_path.as_ref() == Some(&item.path) {
            '>'
        } else {
            ' '
        };

        let size = item
            .size
            .map(|bytes| ByteSize::b(bytes).to_string())
            .unwrap_or_default();

        let modified = item
            .modified_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        let name = if item.is_directory() {
            format!("{}/", item.name)
        } else {
            item.name.to_string()
        };

        println!("{marker} {name:<40} {size:>10}  {modified}");
    }
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
