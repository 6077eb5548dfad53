//! src/controller/tracker.rs
//!
//! Issues listing requests and decides whether a response is still wanted.
//!
//! Responses carry no request id, only the backend that produced them. A
//! response from the wrong backend is never accepted. While an initial listing
//! is outstanding any directory of the current root is accepted, since only one
//! can be outstanding per root. Any other response must be for exactly the
//! directory the current route points at when it arrives.

use compact_str::CompactString;
use tracing::{debug, trace};

use crate::controller::actions::Command;
use crate::fs::normalize::EntrySource;
use crate::model::{
    listing::{ListingMode, ListingRequestContext},
    route::{PathSegments, RootKey, Roots, Route},
    status::BackendStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Discard,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingTracker {
    /// Root the last listing was issued for.
    root: Option<RootKey>,
}

impl ListingTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `Initial` when `route` lives in a different root than the last request.
    #[must_use]
    pub fn mode_for(&self, route: &Route) -> ListingMode {
        if route.root_key() == self.root {
            ListingMode::Additional
        } else {
            ListingMode::Initial
        }
    }

    /// Backend that lists `route`.
    #[must_use]
    pub const fn source_for(route: &Route) -> Option<EntrySource> {
        match route {
            Route::Undecided => None,
            Route::Drive { .. } => Some(EntrySource::Drive),
            Route::Tree { .. } => Some(EntrySource::PublicTree),
        }
    }

    /// Segments a listing for `route` is requested with, and expected back
    /// under. Public trees are prefixed with their resolved root.
    #[must_use]
    pub fn expected_segments(route: &Route, roots: Option<&Roots>) -> Option<PathSegments> {
        match route {
            Route::Undecided => None,
            Route::Drive { path_segments } => Some(path_segments.clone()),
            Route::Tree {
                address,
                path_segments,
            } => {
                let roots = roots.filter(|r| r.serves(address))?;
                let mut segments = PathSegments::with_capacity(path_segments.len() + 1);
                segments.push(roots.resolved.clone());
                segments.extend(path_segments.iter().cloned());
                Some(segments)
            }
        }
    }

    /// Builds the request for `route`. `None` when the route needs no tree or
    /// its address is not resolved yet.
    pub fn issue_listing(&mut self, route: &Route, roots: Option<&Roots>) -> Option<Command> {
        let path_segments = Self::expected_segments(route, roots)?;
        let mode = self.mode_for(route);
        self.root = route.root_key();

        debug!(
            marker = "LISTING_ISSUED",
            operation_type = "listing",
            route = %route,
            mode = %mode,
            "Issuing listing request"
        );

        let context = ListingRequestContext {
            path_segments,
            mode,
        };

        Some(match roots.filter(|_| matches!(route, Route::Tree { .. })) {
            Some(roots) => Command::RequestPublicListing {
                context,
                root: roots.resolved.clone(),
            },
            None => Command::RequestListing(context),
        })
    }

    /// Relevance rule, evaluated against the route current at arrival.
    #[must_use]
    pub fn accept_response(
        &self,
        status: &BackendStatus,
        route: &Route,
        roots: Option<&Roots>,
        source: EntrySource,
        response_segments: &[CompactString],
    ) -> Verdict {
        let expected = Self::source_for(route)
            .filter(|wanted| *wanted == source)
            .and_then(|_| Self::expected_segments(route, roots));

        let accepted = match &expected {
            None => false,
            Some(expected) if status.listing_mode() == Some(ListingMode::Initial) => {
                same_root(route, expected, response_segments)
            }
            Some(expected) => expected.as_slice() == response_segments,
        };

        if accepted {
            return Verdict::Accept;
        }

        trace!(
            marker = "LISTING_STALE",
            operation_type = "listing",
            source = ?source,
            expected = ?expected,
            received = ?response_segments,
            "Discarding stale listing"
        );
        Verdict::Discard
    }

    /// Forget the current root; the next listing is initial again.
    pub fn reset(&mut self) {
        self.root = None;
    }
}

/// Tree responses start with the resolved root they were listed under.
fn same_root(route: &Route, expected: &[CompactString], received: &[CompactString]) -> bool {
    match route {
        Route::Tree { .. } => expected.first() == received.first(),
        _ => true,
    }
}
