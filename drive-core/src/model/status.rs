//! ``src/model/status.rs``
//!
//! Backend readiness:
//!
//! ```text
//! NotNeeded ─► InitialListing ─► Ready ◄─► AdditionalListing
//!                                  ▲
//!                                  └──► Operation(kind)
//! any listing state ─► Error(msg) ─► (next accepted listing) ─► Ready
//! ```

use std::fmt;

use compact_str::CompactString;
use tracing::{debug, info, warn};

use crate::model::listing::ListingMode;

/// Mutating operation currently running against the drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreatingDirectory,
    Renaming,
    Removing,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreatingDirectory => "create directory",
            Self::Renaming => "rename",
            Self::Removing => "remove",
        };

        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendStatus {
    /// The current route shows no tree.
    #[default]
    NotNeeded,

    InitialListing,

    AdditionalListing,

    Ready,

    Operation(OperationKind),

    Error(CompactString),
}

impl BackendStatus {
    /// Mode of the listing in flight, if any.
    #[must_use]
    pub const fn listing_mode(&self) -> Option<ListingMode> {
        match self {
            Self::InitialListing => Some(ListingMode::Initial),
            Self::AdditionalListing => Some(ListingMode::Additional),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_listing(&self) -> bool {
        self.listing_mode().is_some()
    }

    #[inline]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// A listing was issued. An outstanding initial listing keeps its mode
    /// until a response is accepted.
    pub fn begin_listing(&mut self, mode: ListingMode) {
        let next = match (&*self, mode) {
            (Self::InitialListing, _) | (_, ListingMode::Initial) => Self::InitialListing,
            (_, ListingMode::Additional) => Self::AdditionalListing,
        };

        debug!(
            marker = "STATUS_TRANSITION",
            from = ?self,
            to = ?next,
            mode = %mode,
            "Listing issued"
        );

        *self = next;
    }

    pub fn listing_succeeded(&mut self) {
        if !self.is_ready() {
            debug!(marker = "STATUS_TRANSITION", from = ?self, to = "Ready", "Listing applied");
        }

        *self = Self::Ready;
    }

    /// A listing finished while `kind` was still running.
    pub fn resume_operation(&mut self, kind: OperationKind) {
        debug!(marker = "STATUS_TRANSITION", from = ?self, to = %kind, "Operation still running");
        *self = Self::Operation(kind);
    }

    pub fn fail(&mut self, message: impl Into<CompactString>) {
        let message = message.into();
        warn!(marker = "STATUS_ERROR", from = ?self, error = %message, "Backend status failed");
        *self = Self::Error(message);
    }

    /// Starts `kind` when nothing else is running. Returns whether it started.
    pub fn begin_operation(&mut self, kind: OperationKind) -> bool {
        if !self.is_ready() {
            info!(
                marker = "OPERATION_GATED",
                operation_type = %kind,
                status = ?self,
                "Operation ignored while backend is busy"
            );
            return false;
        }

        *self = Self::Operation(kind);
        true
    }

    /// Returns the finished operation, if one was running.
    pub fn finish_operation(&mut self) -> Option<OperationKind> {
        let Self::Operation(kind) = *self else {
            return None;
        };

        *self = Self::Ready;
        Some(kind)
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNeeded => write!(f, "not needed"),
            Self::InitialListing => write!(f, "loading"),
            Self::AdditionalListing => write!(f, "refreshing"),
            Self::Ready => write!(f, "ready"),
            Self::Operation(kind) => write!(f, "running {kind}"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}
