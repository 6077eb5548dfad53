//!  src/util/debounce.rs
//!  ===================================================================
//!  Settle-after-quiet-period coordination for independent concerns.
//!
//!  Each concern keeps a tiny [`DebouncerState`] inside the owned
//!  application state. Feeding input bumps its generation and hands back a
//!  [`SettleTimer`]; the runtime sleeps for the quiet period and reports the
//!  generation back. Only the latest generation of a still pending concern
//!  settles, and it settles once.
//!
//!  The registry reaches into the state through plain function pointers, one
//!  [`DebounceSlot`] per concern, so the state type never has to know about
//!  the coordinator.

use std::{fmt, time::Duration};

use enum_map::{Enum, EnumMap};
use tracing::{debug, trace};

use crate::config::DebounceConfig;

/// Independently debounced concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum DebounceConcern {
    /// Delayed appearance of the loading overlay.
    LoadingOverlay,

    /// Auto-dismissal of notifications.
    Notification,

    /// Resolution of a typed explore address.
    AddressCheck,
}

impl DebounceConcern {
    #[must_use]
    pub fn settle_duration(self, config: &DebounceConfig) -> Duration {
        match self {
            Self::LoadingOverlay => config.loading_overlay,
            Self::Notification => config.notification,
            Self::AddressCheck => config.address_check,
        }
    }
}

impl fmt::Display for DebounceConcern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LoadingOverlay => "loading_overlay",
            Self::Notification => "notification",
            Self::AddressCheck => "address_check",
        };

        write!(f, "{s}")
    }
}

/// Per-concern timer state. Opaque outside this module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebouncerState {
    generation: u64,
    pending: bool,
}

impl DebouncerState {
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Request to report back after `after` with this generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimer {
    pub concern: DebounceConcern,
    pub generation: u64,
    pub after: Duration,
}

/// Accessors for one concern's state inside `S`.
pub struct DebounceSlot<S> {
    pub read: fn(&S) -> &DebouncerState,
    pub write: fn(&mut S) -> &mut DebouncerState,
    pub settle: Duration,
}

// Derives would demand `S: Clone`.
impl<S> Clone for DebounceSlot<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for DebounceSlot<S> {}

impl<S> fmt::Debug for DebounceSlot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceSlot")
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

/// One slot per concern, registered once.
pub struct DebounceRegistry<S> {
    slots: EnumMap<DebounceConcern, DebounceSlot<S>>,
}

impl<S> fmt::Debug for DebounceRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.slots.iter()).finish()
    }
}

impl<S> DebounceRegistry<S> {
    pub fn new(slot_for: impl FnMut(DebounceConcern) -> DebounceSlot<S>) -> Self {
        Self {
            slots: EnumMap::from_fn(slot_for),
        }
    }

    /// Restart the quiet period of `concern`.
    pub fn provide_input(&self, state: &mut S, concern: DebounceConcern) -> SettleTimer {
        let slot = &self.slots[concern];
        let debouncer = (slot.write)(state);

        debouncer.generation = debouncer.generation.wrapping_add(1);
        debouncer.pending = true;

        trace!(
            marker = "DEBOUNCE_INPUT",
            concern = %concern,
            generation = debouncer.generation,
            "Quiet period restarted"
        );

        SettleTimer {
            concern,
            generation: debouncer.generation,
            after: slot.settle,
        }
    }

    /// Suppress the pending settle of `concern`, if any.
    pub fn cancel(&self, state: &mut S, concern: DebounceConcern) {
        let debouncer = (self.slots[concern].write)(state);

        if debouncer.pending {
            debug!(marker = "DEBOUNCE_CANCEL", concern = %concern, "Pending settle cancelled");
        }

        debouncer.pending = false;
    }

    /// Called when a timer fires. Returns `true` when the concern settles.
    pub fn settle(&self, state: &mut S, concern: DebounceConcern, generation: u64) -> bool {
        let debouncer = (self.slots[concern].write)(state);

        if !debouncer.pending || debouncer.generation != generation {
            trace!(
                marker = "DEBOUNCE_STALE",
                concern = %concern,
                generation,
                current = debouncer.generation,
                "Ignoring superseded timer"
            );
            return false;
        }

        debouncer.pending = false;
        true
    }

    #[must_use]
    pub fn is_pending(&self, state: &S, concern: DebounceConcern) -> bool {
        (self.slots[concern].read)(state).is_pending()
    }
}
