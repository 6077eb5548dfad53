//! ``src/model/route.rs``
//! ============================================================================
//! # Route: where the user currently is
//!
//! A route is either the explore screen (no tree needed), a location in the
//! user's own drive, or a location inside a public tree identified by an
//! address. Path segments are the components below the tree root; the
//! depth ("floor") of a location is `segments + 1`.

use std::{fmt, str::FromStr};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::AppError;

/// Ordered path components below a tree root.
pub type PathSegments = SmallVec<[CompactString; 4]>;

/// Prefix used on the command line for public trees: `tree:<address>/a/b`.
const TREE_PREFIX: &str = "tree:";

/// Build `PathSegments` from anything string-like.
pub fn path_segments<I, S>(segments: I) -> PathSegments
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| CompactString::new(s.as_ref()))
        .collect()
}

/// Split a slash separated path, dropping empty components.
pub fn split_path(path: &str) -> PathSegments {
    path_segments(path.split('/').filter(|s| !s.is_empty()))
}

/// Depth of a location; the tree root is floor 1.
#[expect(clippy::cast_possible_truncation, reason = "Paths are never 4 billion deep")]
#[must_use]
pub fn floor_for(segments: &[CompactString]) -> u32 {
    segments.len() as u32 + 1
}

/// Identifies the tree a route lives in. Moving to a different root makes the
/// next listing an initial one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootKey {
    Drive,
    Tree(CompactString),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Route {
    /// The explore screen, where a public address is typed.
    #[default]
    Undecided,

    /// A location in the user's own drive.
    Drive { path_segments: PathSegments },

    /// A location inside a public tree.
    Tree {
        address: CompactString,
        path_segments: PathSegments,
    },
}

impl Route {
    #[must_use]
    pub fn drive<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Drive {
            path_segments: path_segments(segments),
        }
    }

    #[must_use]
    pub fn tree<I, S>(address: &str, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Tree {
            address: CompactString::new(address),
            path_segments: path_segments(segments),
        }
    }

    /// Segments below the tree root (empty on the explore screen).
    #[must_use]
    pub fn path_segments(&self) -> &[CompactString] {
        match self {
            Self::Undecided => &[],
            Self::Drive { path_segments } | Self::Tree { path_segments, .. } => path_segments,
        }
    }

    #[must_use]
    pub fn last_segment(&self) -> Option<&str> {
        self.path_segments().last().map(CompactString::as_str)
    }

    #[must_use]
    pub fn root_key(&self) -> Option<RootKey> {
        match self {
            Self::Undecided => None,
            Self::Drive { .. } => Some(RootKey::Drive),
            Self::Tree { address, .. } => Some(RootKey::Tree(address.clone())),
        }
    }

    /// Whether this route shows a directory tree at all.
    #[must_use]
    pub const fn needs_tree(&self) -> bool {
        !matches!(self, Self::Undecided)
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Tree { address, .. } => Some(address),
            _ => None,
        }
    }

    #[must_use]
    pub fn floor(&self) -> u32 {
        floor_for(self.path_segments())
    }

}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undecided => write!(f, "explore"),
            Self::Drive { path_segments } => write!(f, "/{}", path_segments.join("/")),
            Self::Tree {
                address,
                path_segments,
            } => write!(f, "{TREE_PREFIX}{address}/{}", path_segments.join("/")),
        }
    }
}

impl FromStr for Route {
    type Err = AppError;

    /// `""` or `explore` → explore screen, `tree:<address>/a/b` → public
    /// tree, anything else → drive path.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();

        if input.is_empty() || input == "explore" {
            return Ok(Self::Undecided);
        }

        if let Some(rest) = input.strip_prefix(TREE_PREFIX) {
            let mut segments = split_path(rest).into_iter();
            let address = segments
                .next()
                .ok_or_else(|| AppError::invalid_input("route", "tree route without an address"))?;

            return Ok(Self::Tree {
                address,
                path_segments: segments.collect(),
            });
        }

        Ok(Self::Drive {
            path_segments: split_path(input),
        })
    }
}

/// Outcome of resolving a public address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roots {
    /// What the user typed.
    pub unresolved: CompactString,

    /// The tree root the address points at.
    pub resolved: CompactString,

    /// Whether the address was a name pointing elsewhere.
    #[serde(default)]
    pub is_dns_link: bool,
}

impl Roots {
    #[must_use]
    pub fn serves(&self, address: &str) -> bool {
        self.unresolved == address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_counts_segments() {
        assert_eq!(Route::drive(Vec::<&str>::new()).floor(), 1);
        assert_eq!(Route::drive(["a", "b"]).floor(), 3);
        assert_eq!(Route::tree("docs.example", ["x"]).floor(), 2);
        assert_eq!(Route::Undecided.floor(), 1);
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!("".parse::<Route>().unwrap(), Route::Undecided);
        assert_eq!(
            "/Documents//report.pdf".parse::<Route>().unwrap(),
            Route::drive(["Documents", "report.pdf"])
        );
        assert_eq!(
            "tree:docs.example/guides".parse::<Route>().unwrap(),
            Route::tree("docs.example", ["guides"])
        );
        assert!("tree:".parse::<Route>().is_err());
    }

    #[test]
    fn test_root_key_distinguishes_trees() {
        assert_eq!(Route::drive(["a"]).root_key(), Route::drive(["b"]).root_key());
        assert_ne!(Route::tree("one", ["a"]).root_key(), Route::tree("two", ["a"]).root_key());
        assert_eq!(Route::Undecided.root_key(), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let route = Route::tree("docs.example", ["guides", "intro.md"]);
        assert_eq!(route.to_string().parse::<Route>().unwrap(), route);
    }
}
