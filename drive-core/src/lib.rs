pub mod error;

pub mod config;

pub mod controller {
    pub mod actions;
    pub use actions::{Action, Command};

    pub mod action_dispatcher;

    pub mod event_loop;
    pub use event_loop::EventLoop;

    pub mod tracker;

    pub mod traits;
    pub use traits::DriveBackend;
}

pub mod model {
    pub mod app_state;

    pub mod item;
    pub use item::{Item, ItemKind, MimeCategory};

    pub mod listing;
    pub use listing::{Listing, ListingMode, ListingResult};

    pub mod route;
    pub use route::{PathSegments, Roots, Route};

    pub mod status;
    pub use status::{BackendStatus, OperationKind};

    pub mod ui_state;
    pub use ui_state::{Notification, NotificationLevel, UIState};
}

pub mod view {
    pub mod snapshots;
    pub use snapshots::*;
}

pub use view::*;

pub mod fs {
    pub mod normalize;

    pub mod payload;

    pub mod sort;

    pub mod utils;
}

pub mod operators {
    pub mod local_backend;
}

pub mod logging;
pub use logging::LoggerBuilder;

pub mod util {
    pub mod debounce;
}

pub use error::AppError;

pub use model::{app_state::AppState, ui_state::UIState};
